use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

mod models;
mod services;
mod utils;

use models::responses::LookupResponse;
use services::client::{CatalogClient, ClientError, DEFAULT_CATALOG_URL, LOOKUP_SERVICE_URL};
use services::store::CatalogStore;

struct LookupCompletion {
    token: u64,
    isbn: String,
    outcome: Result<LookupResponse, ClientError>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("book_scanner=info")
        .init();

    let catalog_url =
        std::env::var("CATALOG_URL").unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string());
    let client = CatalogClient::new(catalog_url, LOOKUP_SERVICE_URL.to_string());

    let mut store = CatalogStore::new();
    match client.fetch_catalog().await {
        Ok(books) => store.load_catalog(books),
        Err(e) => error!("Error fetching books: {}", e),
    }

    println!("Book Scanner");
    print_help();
    render(&store);

    let (tx, mut rx) = mpsc::channel::<LookupCompletion>(16);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(input) => {
                        if !dispatch(input.trim(), &mut store, &client, &tx) {
                            break;
                        }
                        prompt();
                    }
                    None => break,
                }
            }
            Some(done) = rx.recv() => {
                if store.apply_lookup(done.token, done.outcome) {
                    render(&store);
                } else {
                    debug!("Dropping stale lookup result for ISBN {}", done.isbn);
                }
                prompt();
            }
        }
    }

    info!("Session closed");
    Ok(())
}

fn dispatch(
    input: &str,
    store: &mut CatalogStore,
    client: &CatalogClient,
    tx: &mpsc::Sender<LookupCompletion>,
) -> bool {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command {
        "" => {}
        "add" => {
            if rest.is_empty() {
                println!("Usage: add <isbn>");
            } else {
                submit_lookup(rest, store, client, tx);
            }
        }
        "search" => {
            store.set_query(rest);
            render(store);
        }
        "next" => {
            if store.next_page() {
                render(store);
            }
        }
        "prev" => {
            if store.prev_page() {
                render(store);
            }
        }
        "show" => render(store),
        "status" => print_status(store),
        "help" => print_help(),
        "quit" | "exit" => return false,
        other => println!("Unknown command: {} (try 'help')", other),
    }
    true
}

fn submit_lookup(
    isbn: &str,
    store: &mut CatalogStore,
    client: &CatalogClient,
    tx: &mpsc::Sender<LookupCompletion>,
) {
    let token = store.begin_lookup(isbn);
    let isbn = isbn.to_string();
    let client = client.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let outcome = client.lookup_isbn(&isbn).await;
        let _ = tx
            .send(LookupCompletion {
                token,
                isbn,
                outcome,
            })
            .await;
    });
}

fn render(store: &CatalogStore) {
    if let Some(message) = store.message() {
        println!("{}", message);
    }
    if let Some(err) = store.error() {
        println!("Error: {}", err);
    }

    let view = store.current_page();
    if store.query().trim().is_empty() {
        println!("Scanned books ({})", view.filtered_len);
    } else {
        println!(
            "Scanned books ({} of {} match \"{}\")",
            view.filtered_len,
            store.books().len(),
            store.query().trim()
        );
    }

    if view.books.is_empty() {
        println!("  (none)");
    }
    for book in &view.books {
        println!(
            "  {:<15} {:<32} {:<24} {:<20} ebook: {:<4} {}",
            book.isbn_13,
            book.title,
            book.author,
            book.publisher,
            book.ebook,
            book.cover.as_deref().unwrap_or("-")
        );
    }

    if view.paged() {
        println!(
            "  Page {} of {}{}{}",
            view.page,
            view.total_pages,
            if view.has_prev { "  [prev]" } else { "" },
            if view.has_next { "  [next]" } else { "" },
        );
    }
}

fn print_status(store: &CatalogStore) {
    match store.loaded_at() {
        Some(at) => println!(
            "Catalog loaded at {} with {} books",
            at.format("%Y-%m-%d %H:%M:%S UTC"),
            store.books().len()
        ),
        None => println!(
            "Catalog not loaded; {} books scanned this session",
            store.books().len()
        ),
    }
    println!(
        "Search: \"{}\" ({} matching)",
        store.query().trim(),
        store.filtered().len()
    );
    match store.pending() {
        Some(isbn) => println!("Lookup in flight for ISBN {}", isbn),
        None => println!("No lookup in flight"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  add <isbn>     look up an ISBN and add the book");
    println!("  search [term]  filter by title, author or publisher");
    println!("  next / prev    page through the results");
    println!("  show           redraw the current page");
    println!("  status         session summary");
    println!("  quit           exit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
