use clap::{Parser, Subcommand, ValueEnum};
use libreria_rust::configs;
use libreria_rust::covers::CoverImageStore;
use libreria_rust::item::repo::{initialize_schema, ObservableLibraryStore, ObservableWishlistStore};
use libreria_rust::item::{Entry, LibraryRepository, ShelfLocation, WishlistRepository};
use libreria_rust::procedure::export;
use libreria_rust::procedure::reconcile::{ReconcileOutcome, Reconciler};
use libreria_rust::procedure::scan::{first_valid_isbn, normalize_isbn, BarcodeSource, LatestSlot, LinesSource};
use libreria_rust::provider::api::google;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

#[derive(Parser)]
#[command(name = "libreria", about = "ISBN 스캔 기반 개인 서재 카탈로그")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Library,
    Wishlist,
}

#[derive(Subcommand)]
enum Command {
    /// ISBN을 판정하고 선택한 컬렉션에 저장 한다. ISBN 생략 시 표준 입력에서 스캔 한다.
    Scan {
        isbn: Option<String>,
        #[arg(long)]
        to: Option<Target>,
        #[arg(long)]
        bookcase: Option<i32>,
        #[arg(long)]
        shelf: Option<i32>,
    },
    /// 서재 목록을 출력 한다
    Library,
    /// 위시리스트 목록을 출력 한다
    Wishlist,
    /// 서재와 위시리스트를 한 목록으로 출력 한다
    All,
    /// 도서 상세를 출력 한다
    Show { isbn: String },
    /// 위시리스트 도서를 서가 위치를 지정해 서재로 승격 한다
    Promote { isbn: String, bookcase: i32, shelf: i32 },
    /// 도서의 서가 위치를 갱신 한다
    Locate { isbn: String, bookcase: i32, shelf: i32 },
    /// 특정 서가에 꽂힌 도서를 출력 한다
    Shelf { bookcase: i32, shelf: i32 },
    /// 서평을 기록 한다
    Review { isbn: String, text: String },
    /// 서재에서 도서를 삭제 한다
    Delete { isbn: String },
    /// 위시리스트에서 도서를 삭제 한다
    RemoveWish { isbn: String },
    /// 서재를 구분자 텍스트 파일로 내보낸다
    Export {
        path: PathBuf,
        #[arg(long)]
        tab: bool,
    },
    /// 표지 이미지를 고정 크기로 다시 인코딩해 저장 한다
    SaveCover { isbn: String, image: PathBuf },
}

type Engine = Reconciler<ObservableLibraryStore, ObservableWishlistStore, google::Client>;

fn main() {
    configs::load_dotenv();
    let config = configs::load_config()
        .unwrap_or_else(|_| panic!("Cannot loading config"));
    configs::set_global_logging_config(&config);

    let pool = configs::connect_to_sqlite(config.db());
    initialize_schema(&pool).expect("Failed to initialize database schema");

    let engine = libreria_rust::create_reconciler(pool)
        .expect("Failed to create catalog client");
    let cover_store = libreria_rust::create_cover_store(&config);

    let cli = Cli::parse();
    match cli.command {
        Command::Scan { isbn, to, bookcase, shelf } => {
            run_scan(&engine, &config, isbn, to, ShelfLocation::from_pair(bookcase, shelf));
        }
        Command::Library => run_library(&engine),
        Command::Wishlist => run_wishlist(&engine),
        Command::All => run_all(&engine),
        Command::Show { isbn } => run_show(&engine, &cover_store, &isbn),
        Command::Promote { isbn, bookcase, shelf } => run_promote(&engine, &isbn, bookcase, shelf),
        Command::Locate { isbn, bookcase, shelf } => run_locate(&engine, &isbn, bookcase, shelf),
        Command::Shelf { bookcase, shelf } => run_shelf(&engine, bookcase, shelf),
        Command::Review { isbn, text } => run_review(&engine, &isbn, text),
        Command::Delete { isbn } => run_delete(&engine, &isbn),
        Command::RemoveWish { isbn } => run_remove_wish(&engine, &isbn),
        Command::Export { path, tab } => run_export(&engine, &config, &path, tab),
        Command::SaveCover { isbn, image } => run_save_cover(&cover_store, &isbn, &image),
    }
}

fn run_scan(
    engine: &Engine,
    config: &configs::AppConfig,
    isbn_arg: Option<String>,
    to: Option<Target>,
    explicit_location: Option<ShelfLocation>,
) {
    let isbn = match isbn_arg {
        Some(raw) => match normalize_isbn(&raw) {
            Some(isbn) => isbn,
            None => {
                eprintln!("not a valid ISBN: {}", raw);
                return;
            }
        },
        None => match scan_from_stdin() {
            Some(isbn) => isbn,
            None => {
                eprintln!("no ISBN scanned");
                return;
            }
        },
    };

    match engine.reconcile(&isbn) {
        Ok(ReconcileOutcome::AlreadyInLibrary(book)) => {
            // 중복은 오류가 아닌 안내다.
            println!("already in library: {} ({})", book.title(), book.isbn());
        }
        Ok(ReconcileOutcome::FoundInWishlist(book)) => {
            println!("found in wishlist: {} ({})", book.title(), book.isbn());
            if to == Some(Target::Library) {
                match explicit_location.or(config.default_shelf_location()) {
                    Some(location) => match engine.promote(&book, location) {
                        Ok(saved) => println!("promoted to library at {}: {}", location, saved.title()),
                        Err(e) => eprintln!("promotion failed: {}", e),
                    },
                    None => eprintln!("promotion needs --bookcase and --shelf"),
                }
            } else {
                println!("re-run with --to library --bookcase N --shelf M to promote");
            }
        }
        Ok(ReconcileOutcome::FetchedFromCatalog(candidate)) => {
            println!("fetched from catalog: {}", candidate.title);
            match to {
                Some(Target::Library) => {
                    let default_location = config.default_shelf_location();
                    match engine.commit_to_library(&candidate, &isbn, explicit_location, default_location) {
                        Ok(saved) => println!("saved to library: {} ({})", saved.title(), saved.isbn()),
                        Err(e) => eprintln!("failed to save book: {}", e),
                    }
                }
                Some(Target::Wishlist) => match engine.commit_to_wishlist(&candidate, &isbn) {
                    Ok(saved) => println!("saved to wishlist: {} ({})", saved.title(), saved.isbn()),
                    Err(e) => eprintln!("failed to save book: {}", e),
                },
                None => println!("re-run with --to library or --to wishlist to save"),
            }
        }
        Ok(ReconcileOutcome::NotFound) => println!("no match in catalog for {}", isbn),
        Ok(ReconcileOutcome::LookupFailed(reason)) => {
            eprintln!("catalog lookup failed: {}. scan again to retry.", reason);
        }
        Err(e) => eprintln!("reconciliation failed: {}", e),
    }
}

/// 최신 값 슬롯을 바코드 시퀀스로 소비하는 소스
struct SlotSource {
    slot: Arc<LatestSlot<String>>,
}

impl BarcodeSource for SlotSource {
    fn next_code(&mut self) -> Option<String> {
        self.slot.recv()
    }
}

/// 표준 입력을 바코드 스트림으로 읽는다.
///
/// 디코더 스레드는 최신 값 하나만 유지하는 슬롯에 값을 밀어 넣고,
/// 본 워크플로는 형태 검사를 통과한 첫 값을 소비한 뒤 슬롯을 닫는다.
fn scan_from_stdin() -> Option<String> {
    let slot = Arc::new(LatestSlot::new());
    let producer_slot = Arc::clone(&slot);

    thread::spawn(move || {
        let mut source = LinesSource::new(io::stdin().lock());
        while let Some(code) = source.next_code() {
            producer_slot.publish(code);
        }
        producer_slot.close();
    });

    let mut source = SlotSource { slot: Arc::clone(&slot) };
    let isbn = first_valid_isbn(&mut source);
    slot.close();

    isbn
}

fn run_library(engine: &Engine) {
    match engine.library().get_all() {
        Ok(books) => {
            for book in books {
                let location = book.location()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_owned());
                println!("{}  {}  {}  {}", book.isbn(), location, book.title(), book.author());
            }
        }
        Err(e) => eprintln!("failed to load library: {}", e),
    }
}

fn run_wishlist(engine: &Engine) {
    match engine.wishlist().get_all() {
        Ok(books) => {
            for book in books {
                println!("{}  {}  {}", book.isbn(), book.title(), book.author());
            }
        }
        Err(e) => eprintln!("failed to load wishlist: {}", e),
    }
}

fn run_all(engine: &Engine) {
    let library = match engine.library().get_all() {
        Ok(books) => books,
        Err(e) => {
            eprintln!("failed to load library: {}", e);
            return;
        }
    };
    let wishlist = match engine.wishlist().get_all() {
        Ok(books) => books,
        Err(e) => {
            eprintln!("failed to load wishlist: {}", e);
            return;
        }
    };

    let entries = library.into_iter()
        .map(Entry::Library)
        .chain(wishlist.into_iter().map(Entry::Wishlist));

    for entry in entries {
        let marker = match &entry {
            Entry::Library(_) => "L",
            Entry::Wishlist(_) => "W",
        };
        println!("[{}] {}  {}  {}", marker, entry.isbn(), entry.title(), entry.author());
    }
}

fn run_show(engine: &Engine, cover_store: &CoverImageStore, isbn: &str) {
    match engine.library().find_by_isbn(isbn) {
        Ok(Some(book)) => {
            println!("ISBN: {}", book.isbn());
            println!("Title: {}", book.title());
            println!("Author: {}", book.author());
            println!("Publisher: {}", book.publisher().unwrap_or("-"));
            println!("Pages: {}", book.page_count().map(|v| v.to_string()).unwrap_or_else(|| "-".to_owned()));
            println!("Price: {}", book.price().map(|v| v.to_string()).unwrap_or_else(|| "-".to_owned()));
            println!("Location: {}", book.location().map(|l| l.to_string()).unwrap_or_else(|| "-".to_owned()));
            println!("Synopsis: {}", book.synopsis().unwrap_or("-"));
            println!("Review: {}", book.review().unwrap_or("-"));
            let cover = cover_store.resolve_display_cover(book.isbn(), book.cover_url());
            println!("Cover: {}", cover.unwrap_or_else(|| "-".to_owned()));
        }
        Ok(None) => eprintln!("no such book in library: {}", isbn),
        Err(e) => eprintln!("failed to load book: {}", e),
    }
}

fn run_promote(engine: &Engine, isbn: &str, bookcase: i32, shelf: i32) {
    let location = match ShelfLocation::new(bookcase, shelf) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("invalid shelf location: {}", e);
            return;
        }
    };

    match engine.wishlist().find_by_isbn(isbn) {
        Ok(Some(book)) => match engine.promote(&book, location) {
            Ok(saved) => println!("promoted to library at {}: {}", location, saved.title()),
            Err(e) => eprintln!("promotion failed: {}", e),
        },
        Ok(None) => eprintln!("no such book in wishlist: {}", isbn),
        Err(e) => eprintln!("failed to load wishlist book: {}", e),
    }
}

fn run_locate(engine: &Engine, isbn: &str, bookcase: i32, shelf: i32) {
    let location = match ShelfLocation::new(bookcase, shelf) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("invalid shelf location: {}", e);
            return;
        }
    };

    match engine.library().update_location(isbn, &location) {
        Ok(0) => eprintln!("no such book in library: {}", isbn),
        Ok(_) => println!("moved {} to {}", isbn, location),
        Err(e) => eprintln!("failed to update location: {}", e),
    }
}

fn run_shelf(engine: &Engine, bookcase: i32, shelf: i32) {
    let location = match ShelfLocation::new(bookcase, shelf) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("invalid shelf location: {}", e);
            return;
        }
    };

    match engine.library().find_by_location(&location) {
        Ok(books) => {
            for book in books {
                println!("{}  {}  {}", book.isbn(), book.title(), book.author());
            }
        }
        Err(e) => eprintln!("failed to load shelf: {}", e),
    }
}

fn run_review(engine: &Engine, isbn: &str, text: String) {
    match engine.library().find_by_isbn(isbn) {
        Ok(Some(book)) => {
            let updated = book.to_builder()
                .review(text)
                .build()
                .expect("existing book always rebuilds");

            match engine.library().upsert(&updated) {
                Ok(_) => println!("review saved for {}", isbn),
                Err(e) => eprintln!("failed to save review: {}", e),
            }
        }
        Ok(None) => eprintln!("no such book in library: {}", isbn),
        Err(e) => eprintln!("failed to load book: {}", e),
    }
}

fn run_delete(engine: &Engine, isbn: &str) {
    match engine.library().find_by_isbn(isbn) {
        Ok(Some(book)) => match engine.library().delete(&book) {
            Ok(_) => println!("deleted from library: {}", isbn),
            Err(e) => eprintln!("failed to delete book: {}", e),
        },
        Ok(None) => eprintln!("no such book in library: {}", isbn),
        Err(e) => eprintln!("failed to load book: {}", e),
    }
}

fn run_remove_wish(engine: &Engine, isbn: &str) {
    match engine.wishlist().find_by_isbn(isbn) {
        Ok(Some(book)) => match engine.wishlist().delete(&book) {
            Ok(_) => println!("deleted from wishlist: {}", isbn),
            Err(e) => eprintln!("failed to delete book: {}", e),
        },
        Ok(None) => eprintln!("no such book in wishlist: {}", isbn),
        Err(e) => eprintln!("failed to load book: {}", e),
    }
}

fn run_export(engine: &Engine, config: &configs::AppConfig, path: &PathBuf, tab: bool) {
    let separator = if tab {
        export::Separator::Tab
    } else {
        config.export_separator()
    };

    match engine.library().get_all() {
        Ok(books) => match export::export_to_file(path, &books, separator) {
            Ok(()) => println!("exported {} books to {}", books.len(), path.display()),
            Err(e) => eprintln!("export failed: {}", e),
        },
        Err(e) => eprintln!("failed to load library: {}", e),
    }
}

fn run_save_cover(cover_store: &CoverImageStore, isbn: &str, image: &PathBuf) {
    match cover_store.save_file(isbn, image) {
        Ok(path) => println!("cover saved: {}", path.display()),
        Err(e) => eprintln!("failed to save cover: {}", e),
    }
}
