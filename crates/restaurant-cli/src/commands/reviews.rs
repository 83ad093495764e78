use restaurant_core::{
    AssetManifest, Delivery, NewReview, RestaurantId, SyncManager, SYNC_NEW_REVIEWS,
};

use crate::commands::common::{
    format_review_lines, format_timestamp, pending_review_to_item, PendingReviewItem, Session,
};
use crate::error::CliError;

pub async fn run_review(
    session: &Session,
    id: RestaurantId,
    name: &str,
    rating: u8,
    comments: &str,
    defer: bool,
) -> Result<(), CliError> {
    let mut gateway = session.gateway();
    if defer {
        gateway = gateway.with_background_sync(SyncManager::new());
    }

    let mut restaurant = gateway.fetch_restaurant_by_id(id).await?;
    let delivery = gateway
        .submit_review(&mut restaurant, NewReview::new(name, rating, comments))
        .await
        .map_err(|error| match error {
            restaurant_core::Error::Network(message) => CliError::ReviewNotSent(message),
            other => CliError::Core(other),
        })?;

    match delivery {
        Delivery::Sent => println!("Review for {} sent", restaurant.name),
        Delivery::Deferred { created_at } => println!(
            "Review for {} queued at {}; run `restaurants sync` to deliver it",
            restaurant.name,
            format_timestamp(created_at)
        ),
    }
    Ok(())
}

pub async fn run_pending(session: &Session, as_json: bool) -> Result<(), CliError> {
    let pending = session.gateway().queue().list_pending().await?;

    if as_json {
        let json_items = pending
            .iter()
            .map(pending_review_to_item)
            .collect::<Vec<PendingReviewItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("No pending reviews.");
        return Ok(());
    }

    for (review, line) in pending.iter().zip(format_review_lines(&pending)) {
        println!("restaurant {:>3}  {line}", review.restaurant_id.get());
    }
    Ok(())
}

pub async fn run_sync(session: &Session) -> Result<(), CliError> {
    let worker = session.worker(AssetManifest::default());
    let Some(report) = worker.sync(SYNC_NEW_REVIEWS).await? else {
        return Ok(());
    };

    if report.delivered.is_empty() && report.retained.is_empty() {
        println!("No pending reviews.");
        return Ok(());
    }

    println!("Delivered {} review(s)", report.delivered.len());
    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::SyncIncomplete(report.retained.len()))
    }
}
