use reddit_companion::reddit::Reddit;
use reddit_companion::reddit::auth::Credentials;
use reddit_companion::reddit::service::{RedditService, Service};
use reddit_companion::tools;
use regex::Regex;

// These tests talk to the live Reddit API, so they need real credentials
// in the environment (or in .env) and are ignored by default. Run them with
//
//     cargo test -- --ignored
//
// What comes back changes constantly, so they mostly check that requests
// authenticate and that responses have the expected shape.

fn service() -> RedditService {
    let _ = dotenvy::dotenv();
    let credentials = Credentials::from_env().expect("Reddit credentials are not set");
    RedditService::new(credentials)
}

#[tokio::test]
#[ignore = "requires Reddit credentials"]
async fn it_authenticates() {
    let resp = service().get_resource("/api/v1/me", &[]).await.unwrap();
    assert!(resp.contains("\"name\""));
}

#[tokio::test]
#[ignore = "requires Reddit credentials"]
async fn it_retrieves_new_posts() {
    let resp = service()
        .get_resource("/r/all/new", &[("limit", "2".to_string())])
        .await
        .unwrap();
    assert!(resp.contains("\"Listing\""));
}

#[tokio::test]
#[ignore = "requires Reddit credentials"]
async fn it_reuses_its_token() {
    let service = service();
    service.get_resource("/api/v1/me", &[]).await.unwrap();
    let resp = service.get_resource("/api/multi/mine", &[]).await.unwrap();
    assert!(resp.starts_with('['));
}

#[tokio::test]
#[ignore = "requires Reddit credentials"]
async fn it_formats_new_posts() {
    let reddit = Reddit::new(service());
    let output = tools::read_new_posts(&reddit, 3).await.unwrap();
    let link = Regex::new(r"(?m)^Link: https://reddit\.com/r/\w+/comments/\w+/").unwrap();
    assert!(output.starts_with("\n=== Latest Posts ===\n"));
    assert_eq!(link.find_iter(&output).count(), 3);
}

#[tokio::test]
#[ignore = "requires Reddit credentials"]
async fn it_formats_engagement_dates() {
    let reddit = Reddit::new(service());
    let output = tools::get_post_engagement(&reddit, None, 1).await.unwrap();
    let created = Regex::new(r"(?m)^Created: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} UTC$").unwrap();
    assert!(output == "No recent posts found" || created.is_match(&output));
}
