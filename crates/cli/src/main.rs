use anyhow::Context;
use clap::{Parser, Subcommand};

use bookstore_app::modules::books::models::CreateBook;
use bookstore_cli::{client::ApiClient, render_book, render_books, render_summary, simulate_purchases};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Command-line client for the bookstore API")]
struct Cli {
    /// Base URL of the bookstore server
    #[arg(
        long,
        global = true,
        env = "BOOKSTORE_API_URL",
        default_value = "http://localhost:5001"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every book
    List,
    /// Show one book
    Get { id: String },
    /// Add a book to the inventory
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, allow_hyphen_values = true)]
        price: f64,
        #[arg(long, allow_hyphen_values = true)]
        stock: i64,
    },
    /// Buy copies of a book, optionally racing several requests at once
    Purchase {
        id: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url);
    tracing::debug!(api_url = %cli.api_url, command = ?cli.command, "running command");

    match cli.command {
        Command::List => {
            let books = client.list().await.context("failed to list books")?;
            println!("{}", render_books(&books));
        }
        Command::Get { id } => {
            let book = client.get(&id).await.context("failed to fetch book")?;
            println!("{}", render_book(&book));
        }
        Command::Create {
            title,
            author,
            price,
            stock,
        } => {
            let request = CreateBook {
                title,
                author,
                price,
                stock,
            };
            let book = client.create(&request).await.context("failed to create book")?;
            println!("{}", render_book(&book));
        }
        Command::Purchase { id, concurrency: 1 } => {
            let receipt = client.purchase(&id).await.context("purchase failed")?;
            println!("{}\n{}", receipt.message, render_book(&receipt.book));
        }
        Command::Purchase { id, concurrency } => {
            let summary = simulate_purchases(&client, &id, usize::from(concurrency))
                .await
                .context("purchase simulation failed")?;
            println!("{}", render_summary(&summary));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_negative_numbers_for_server_validation() {
        let cli = Cli::try_parse_from([
            "bookstore-cli",
            "create",
            "--title",
            "Dune",
            "--author",
            "Frank Herbert",
            "--price",
            "-1.5",
            "--stock",
            "-2",
        ])
        .unwrap();

        match cli.command {
            Command::Create { price, stock, .. } => {
                assert_eq!(price, -1.5);
                assert_eq!(stock, -2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn purchase_concurrency_defaults_to_one() {
        let cli = Cli::try_parse_from(["bookstore-cli", "purchase", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Purchase { concurrency: 1, .. }
        ));
    }

    #[test]
    fn purchase_concurrency_zero_is_rejected() {
        assert!(
            Cli::try_parse_from(["bookstore-cli", "purchase", "abc", "--concurrency", "0"])
                .is_err()
        );
    }

    #[test]
    fn api_url_flag_is_global() {
        let cli = Cli::try_parse_from(["bookstore-cli", "list", "--api-url", "http://books:9000"])
            .unwrap();
        assert_eq!(cli.api_url, "http://books:9000");
    }
}
