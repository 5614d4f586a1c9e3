//! Operator CLI for the saezuri schedule store.
//!
//! Talks straight to the schedule file in the configured GitHub repository.
//! The token comes from `GITHUB_TOKEN` or an interactive prompt and is never
//! echoed or logged.

use clap::{Parser, Subcommand};
use saezuri_github::{GitHubClient, GitHubConfig};
use saezuri_store::{ConfigPatch, NewPost, PostStore, ThreadItem};

/// Manage the GitHub-backed post schedule.
#[derive(Parser)]
#[command(name = "saezuri", about = "Manage the GitHub-backed post schedule")]
struct Cli {
    /// Repository owner
    #[arg(long, env = "GITHUB_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO")]
    repo: String,

    /// Path of the schedule file in the repository
    #[arg(long, default_value = "posts.json")]
    file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List scheduled posts
    List,
    /// Show one post as JSON
    Show {
        /// Post ID
        id: String,
    },
    /// Schedule a new post
    Create {
        /// tweet, thread, or repost
        #[arg(long, default_value = "tweet")]
        kind: String,
        /// ISO-8601 instant to post at
        #[arg(long)]
        at: String,
        /// Tweet text
        #[arg(long)]
        text: Option<String>,
        /// Thread item text (repeat the flag, in order)
        #[arg(long = "thread-text")]
        thread_text: Vec<String>,
        /// Tweet ID to repost
        #[arg(long)]
        target: Option<String>,
    },
    /// Delete a post
    Delete {
        /// Post ID
        id: String,
    },
    /// Show the config, or set fields
    Config {
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long)]
        interval_minutes: Option<u32>,
        #[arg(long)]
        daily_limit: Option<u32>,
        #[arg(long)]
        monthly_limit: Option<u32>,
        #[arg(long)]
        retry_max: Option<u32>,
    },
    /// Show the execution history
    History,
    /// Show the posting counters
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            eprint!("GitHub token: ");
            rpassword::read_password()?
        }
    };

    let client = GitHubClient::new(GitHubConfig {
        owner: cli.owner,
        repo: cli.repo,
        token,
    })?;
    let store = PostStore::new(client, cli.file);

    match cli.command {
        Commands::List => {
            let posts = store.list_posts().await?;
            if posts.is_empty() {
                println!("no posts scheduled");
            }
            for post in posts {
                println!(
                    "{}  {:<7}  {:<9}  {}",
                    post.id, post.kind, post.status, post.scheduled_at
                );
            }
        }

        Commands::Show { id } => match store.get_post(&id).await? {
            Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
            None => {
                eprintln!("post not found: {}", id);
                std::process::exit(1);
            }
        },

        Commands::Create {
            kind,
            at,
            text,
            thread_text,
            target,
        } => {
            let new = match kind.as_str() {
                "tweet" => NewPost::tweet(
                    text.ok_or("--text is required for tweets")?,
                    at,
                ),
                "thread" => {
                    let items: Vec<ThreadItem> = thread_text
                        .into_iter()
                        .map(|text| ThreadItem {
                            text,
                            media: None,
                            posted_tweet_id: None,
                        })
                        .collect();
                    NewPost::thread(items, at)
                }
                "repost" => NewPost::repost(
                    target.ok_or("--target is required for reposts")?,
                    at,
                ),
                other => return Err(format!("unknown post type: {}", other).into()),
            };

            let post = store.create_post(new).await?;
            println!("{}", serde_json::to_string_pretty(&post)?);
        }

        Commands::Delete { id } => {
            store.delete_post(&id).await?;
            println!("deleted {}", id);
        }

        Commands::Config {
            timezone,
            interval_minutes,
            daily_limit,
            monthly_limit,
            retry_max,
        } => {
            let patch = ConfigPatch {
                timezone,
                interval_minutes,
                daily_limit,
                monthly_limit,
                retry_max,
            };
            let config = if patch == ConfigPatch::default() {
                store.get_config().await?
            } else {
                store.update_config(patch).await?
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::History => {
            let history = store.get_history().await?;
            if history.is_empty() {
                println!("no history yet");
            }
            for entry in history {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }

        Commands::Stats => {
            let stats = store.get_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
