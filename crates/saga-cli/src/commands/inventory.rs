use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use saga_profile::{PlayerProfile, StorageKeys, StoredProfile};

pub fn run(save_dir: &Path) -> Result<(), String> {
    let storage = super::open_saves(save_dir)?;
    let profile = StoredProfile::load(storage, &StorageKeys::default());

    let items = profile.list_items();
    if items.is_empty() {
        println!("  Inventory is empty.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Item", "Qty"]);
        for item in &items {
            table.add_row(vec![item.id.to_string(), item.qty.to_string()]);
        }
        println!("{table}");
        println!();
    }
    println!("  Wallet: {}", profile.currency());
    Ok(())
}
