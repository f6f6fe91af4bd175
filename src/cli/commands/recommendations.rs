//! List recommendations command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_recommendations(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let recommendations = store.list_active_recommendations().await?;

    if recommendations.is_empty() {
        println!("No active recommendations.");
        println!();
        println!("Add one from the admin dashboard (POST /admin/add).");
        return Ok(());
    }

    println!("Active Recommendations ({} total)", recommendations.len());
    println!("{:-<70}", "");

    for rec in recommendations {
        println!(
            "#{} {} [{}]",
            rec.id,
            rec.movie_title,
            rec.category.as_deref().unwrap_or("-")
        );
        println!("  TMDB: {} | Added: {}", rec.movie_id, rec.created_at);
    }

    Ok(())
}
