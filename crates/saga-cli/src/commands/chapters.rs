use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use saga_profile::{ChapterUnlocks, StorageKeys, UnlockStore};

pub fn run(script_path: &Path, save_dir: &Path) -> Result<(), String> {
    let script = super::load_script(script_path)?;
    let storage = super::open_saves(save_dir)?;
    let unlocks = UnlockStore::open(storage, &StorageKeys::default(), &script.first_chapter);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Chapter", "Title", "Slides", "Status"]);

    for chapter in &script.chapters {
        let status = if unlocks.is_unlocked(&chapter.id) {
            "unlocked"
        } else {
            "locked"
        };
        let title = if chapter.title.is_empty() {
            "-"
        } else {
            chapter.title.as_str()
        };
        table.add_row(vec![
            chapter.id.to_string(),
            title.to_string(),
            chapter.slides.len().to_string(),
            status.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} of {} chapters unlocked",
        script
            .chapters
            .iter()
            .filter(|chapter| unlocks.is_unlocked(&chapter.id))
            .count(),
        script.chapters.len()
    );
    Ok(())
}
