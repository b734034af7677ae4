use crate::item::repo::SqlitePool;
use crate::item::ShelfLocation;
use crate::procedure::export::Separator;
use diesel::r2d2::ConnectionManager;
use diesel::SqliteConnection;
use r2d2::Pool;
use serde::Deserialize;
use std::env;

mod logging;

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// 애플리케이션 설정
///
/// 기본 서가 위치는 여기서 한 번 읽혀 판정 엔진에 명시적으로 전달 된다.
/// 엔진 내부에서 전역 상태로 읽는 곳은 없다.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    db: Database,
    covers: Covers,
    export: Export,
    logger: logging::Config,
    default_location: Option<DefaultLocation>,
}

impl AppConfig {
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn covers_dir(&self) -> &str {
        &self.covers.dir
    }

    /// 설정된 기본 서가 위치를 검증해 반환 한다. 유효하지 않은 값은 없는 것으로 취급 한다.
    pub fn default_shelf_location(&self) -> Option<ShelfLocation> {
        self.default_location
            .as_ref()
            .and_then(|l| ShelfLocation::new(l.bookcase, l.shelf).ok())
    }

    pub fn export_separator(&self) -> Separator {
        match self.export.separator.as_str() {
            "tab" => Separator::Tab,
            _ => Separator::Comma,
        }
    }

    pub fn logger(&self) -> &logging::Config {
        &self.logger
    }
}

#[derive(Debug, Deserialize)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct Covers {
    dir: String,
}

#[derive(Debug, Deserialize)]
struct Export {
    separator: String,
}

#[derive(Debug, Deserialize)]
struct DefaultLocation {
    bookcase: i32,
    shelf: i32,
}

/// 실행 환경에 맞는 설정 파일을 읽는다.
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let config = config::Config::builder()
        .add_source(config::File::with_name(&format!("config/{}.json", env)))
        .build()?;

    config.try_deserialize()
}

/// 데이터베이스 연결 풀을 생성한다.
pub fn connect_to_sqlite(db: &Database) -> SqlitePool {
    let manager = ConnectionManager::<SqliteConnection>::new(db.path());

    Pool::builder()
        .test_on_check_out(true)
        .build(manager)
        .expect("Could not build connection pool")
}

/// 프로그램에서 사용할 로깅 옵션을 설정한다.
pub fn set_global_logging_config(config: &AppConfig) {
    logging::set_global_logging_config(config.logger());
}
