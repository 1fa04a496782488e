use std::time::Duration;

use gdpr_client::{FetchByStatusInput, GdprClient, Paginated, RequestStatus, RetryPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = GdprClient::from_env()?;
    let options = client
        .options()
        .clone()
        .with_retry_policy(RetryPolicy {
            max_retries: 5,
            ..RetryPolicy::default()
        })
        .with_overall_timeout(Duration::from_secs(30));
    let client = client.with_options(options)?;

    let mut cursor: Option<String> = None;
    let mut total = 0usize;
    loop {
        let mut input = FetchByStatusInput::new(RequestStatus::Pending);
        if let Some(key) = cursor.take() {
            input = input.after(key);
        }

        let page = client.fetch_delete_requests_by_status(input).await?;
        for record in page.records()? {
            println!(
                "{} {} created by {}",
                record.partition_key,
                record.range_key.as_deref().unwrap_or("-"),
                record.created_by
            );
        }
        total += page.results.len();

        if !page.has_more() {
            break;
        }
        cursor = page.last_range_key;
    }

    eprintln!("{total} pending deletion request(s)");
    Ok(())
}
