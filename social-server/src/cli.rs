use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::security::JwtKeys;
use crate::server::{postgres_repositories, start_http_server};

#[derive(Parser, Debug)]
#[command(name = "social-server", about = "Social blogging server and admin tasks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run migrations and serve HTTP (default).
    Serve,
    CreateGroup {
        #[arg(long)]
        title: String,
        /// Derived from the title when omitted.
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Posts of the group stay, detached from it.
    DeleteGroup { slug: String },
    /// Removes the user with their posts, comments and follow edges.
    DeleteUser { username: String },
    DeletePost { id: Uuid },
}

pub async fn run(command: Command, config: AppConfig, pool: PgPool) -> anyhow::Result<()> {
    let repos = postgres_repositories(&pool);

    match command {
        Command::Serve => return start_http_server(config, pool).await,
        Command::CreateGroup {
            title,
            slug,
            description,
        } => {
            let group = GroupService::new(Arc::clone(&repos.groups))
                .create_group(&title, slug.as_deref(), &description)
                .await?;
            info!(group_id = %group.id, slug = %group.slug, "group created");
            println!("created group {} ({})", group.slug, group.id);
        }
        Command::DeleteGroup { slug } => {
            GroupService::new(Arc::clone(&repos.groups))
                .delete_group(&slug)
                .await?;
            println!("deleted group {slug}");
        }
        Command::DeleteUser { username } => {
            AuthService::new(
                Arc::clone(&repos.users),
                JwtKeys::new(config.jwt_secret.clone()),
            )
            .delete_user(&username)
            .await?;
            println!("deleted user {username}");
        }
        Command::DeletePost { id } => {
            PostService::new(
                Arc::clone(&repos.posts),
                Arc::clone(&repos.groups),
                MediaStorage::new(config.media_root.clone()),
            )
            .delete_post(id)
            .await?;
            println!("deleted post {id}");
        }
    }

    Ok(())
}
