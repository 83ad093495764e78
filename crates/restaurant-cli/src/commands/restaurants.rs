use restaurant_core::{AppState, RestaurantId};

use crate::commands::common::{
    format_restaurant_lines, format_review_lines, format_stars, restaurant_to_list_item,
    source_label, RestaurantListItem, Session,
};
use crate::error::CliError;

pub async fn run_list(
    session: &Session,
    cuisine: &str,
    neighborhood: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let mut state = AppState::new();
    state.select(cuisine, neighborhood);
    state.refresh(&session.gateway()).await;

    if as_json {
        let json_items = state
            .restaurants
            .iter()
            .map(restaurant_to_list_item)
            .collect::<Vec<RestaurantListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if state.restaurants.is_empty() {
        println!("No restaurants found.");
        return Ok(());
    }

    for line in format_restaurant_lines(&state.restaurants) {
        println!("{line}");
    }
    if let Some(source) = state.source {
        tracing::debug!(
            "Listed {} restaurants from {}",
            state.restaurants.len(),
            source_label(source)
        );
    }
    Ok(())
}

pub async fn run_show(session: &Session, id: RestaurantId, as_json: bool) -> Result<(), CliError> {
    let restaurant = session.gateway().fetch_restaurant_by_id(id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&restaurant)?);
        return Ok(());
    }

    let favorite = if restaurant.is_favorite { " (favorite)" } else { "" };
    println!("{}{favorite}", restaurant.name);
    println!("{} · {}", restaurant.cuisine_type, restaurant.neighborhood);
    println!("{}", restaurant.address);
    println!("Photo: {}", restaurant.image_url());

    if let Some(hours) = &restaurant.operating_hours {
        println!();
        for (day, open) in hours {
            println!("{day:<10} {open}");
        }
    }

    println!();
    match restaurant.average_rating() {
        Some(average) => {
            let rounded = average.round().clamp(0.0, 5.0);
            // Clamped to 0..=5 above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let stars = format_stars(rounded as u8);
            println!(
                "{stars} {average:.1} from {} review(s)",
                restaurant.reviews.len()
            );
            for line in format_review_lines(&restaurant.reviews) {
                println!("  {line}");
            }
        }
        None => println!("No reviews yet!"),
    }
    Ok(())
}

pub async fn run_neighborhoods(session: &Session) -> Result<(), CliError> {
    for neighborhood in session.gateway().fetch_neighborhoods().await {
        println!("{neighborhood}");
    }
    Ok(())
}

pub async fn run_cuisines(session: &Session) -> Result<(), CliError> {
    for cuisine in session.gateway().fetch_cuisines().await {
        println!("{cuisine}");
    }
    Ok(())
}

pub async fn run_favorite(
    session: &Session,
    id: RestaurantId,
    is_favorite: bool,
) -> Result<(), CliError> {
    let gateway = session.gateway();
    let mut restaurant = gateway.fetch_restaurant_by_id(id).await?;
    let update = gateway.set_favorite(&mut restaurant, is_favorite).await;

    let action = if is_favorite { "Favorited" } else { "Unfavorited" };
    if update.confirmed {
        println!("{action} {}", restaurant.name);
    } else {
        println!("{action} {} locally; the server has not confirmed it yet", restaurant.name);
    }
    Ok(())
}
