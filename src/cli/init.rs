use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(db_flag: Option<&str>, data_dir: Option<String>) -> Result<()> {
    // An explicit --db path (or $PENNY_DB) bypasses settings entirely.
    let override_path = db_flag
        .map(str::to_string)
        .or_else(|| std::env::var("PENNY_DB").ok().filter(|p| !p.is_empty()));
    if let Some(db) = override_path {
        let path = PathBuf::from(shellexpand_path(&db));
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = get_connection(&path)?;
        init_db(&conn)?;
        println!("Database initialized at {}", path.display());
        return Ok(());
    }

    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let db_path = resolved.join("penny.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    println!("Database initialized at {}", db_path.display());
    Ok(())
}
