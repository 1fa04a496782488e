use gdpr_client::{
    ClientOptions, CreateRequestInput, FetchRequestInput, GdprClient, RequestStatus,
    UpdateRequestInput,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("GDPR_BASE_URL")?;
    let api_key = std::env::var("GDPR_API_KEY")?;

    let client = GdprClient::new(base_url, api_key)
        .with_options(ClientOptions::default().with_environment("Dev"))?;

    let created = client
        .create_info_request(CreateRequestInput::info("user-42", "support-bot"))
        .await?;
    println!("created: {created:?}");

    let Some(range_key) = created.range_key else {
        anyhow::bail!("service did not assign a range key");
    };

    client
        .update_info_request(
            UpdateRequestInput::new("user-42", &range_key).with_status(RequestStatus::Complete),
        )
        .await?;

    let fetched = client
        .fetch_info_request(FetchRequestInput::new("user-42", &range_key))
        .await?;
    println!("fetched: {fetched:?}");

    Ok(())
}
