use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use lookup_select::prelude::*;
use lookup_select::slots::{FooterProps, render};
use serde::Serialize;
use simplelog::{Config, LevelFilter, WriteLogger};

#[derive(Debug, Clone, Serialize)]
struct Customer {
    id: u32,
    name: String,
    city: String,
    tier: &'static str,
}

impl LookupRow for Customer {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "city" => Some(self.city.clone()),
            "tier" => Some(self.tier.to_string()),
            _ => None,
        }
    }
}

fn customers() -> Vec<Customer> {
    const FIRST: [&str; 8] = ["Ayla", "Bora", "Cem", "Deniz", "Ece", "Firat", "Gul", "Hakan"];
    const LAST: [&str; 6] = ["Aksoy", "Demir", "Kaya", "Sahin", "Yildiz", "Ozturk"];
    const CITIES: [&str; 5] = ["Ankara", "Bursa", "Istanbul", "Izmir", "Antalya"];
    const TIERS: [&str; 4] = ["gold", "silver", "bronze", "suspended"];

    (0..240u32)
        .map(|i| Customer {
            id: 1000 + i,
            name: format!(
                "{} {}",
                FIRST[i as usize % FIRST.len()],
                LAST[i as usize / FIRST.len() % LAST.len()]
            ),
            city: CITIES[i as usize % CITIES.len()].to_string(),
            tier: TIERS[i as usize * 7 % TIERS.len()],
        })
        .collect()
}

/// Footer that only shows the counter.
struct CompactSlots;

impl Slots<Customer> for CompactSlots {
    fn footer(&self, props: &FooterProps) -> Vec<String> {
        vec![format!("── {} picked ──", props.selected_count)]
    }
}

/// Waits for the in-flight fetch, then folds it into the selection.
async fn wait_for_rows(lookup: &mut SelectionController<Customer>) -> Result<(), LookupError> {
    while lookup.loading() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    lookup.sync();
    match lookup.error() {
        Some(message) => Err(FetchError::from(message).into()),
        None => Ok(()),
    }
}

fn print_lines(title: &str, lines: &[String]) {
    println!("== {title}");
    for line in lines {
        println!("{line}");
    }
    println!();
}

#[tokio::main]
async fn main() {
    let log_file = File::create("lookup-select-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        error!("Demo failed: {}", e);
        eprintln!("Error: {}", e);
    }
}

async fn run() -> Result<(), LookupError> {
    let source = InMemorySource::new(customers(), ["name", "city", "tier"])
        .with_latency(Duration::from_millis(40));
    let mapper = FnMapper::new(
        |c: &Customer| Identity::from(c.id),
        |c: &Customer| c.name.clone(),
    );

    let config = LookupConfig::new(Arc::new(mapper), RowSource::remote(source))
        .with_mode(SelectMode::Multiple)
        .with_columns(vec![
            Column::new("name", "Name").sortable().with_width(18),
            Column::new("city", "City").sortable().with_width(10),
            Column::new("tier", "Tier"),
        ])
        .with_selectable_row(SelectableRow::new(|c: &Customer| c.tier != "suspended"))
        .with_virtualization(
            VirtualizationConfig::default()
                .with_enabled(true)
                .with_row_height(1.0)
                .with_container_height(8.0)
                .with_overscan(2)
                .with_threshold(30),
        );

    let callbacks = Callbacks::new()
        .on_selection_change(|rows: &[Customer]| {
            info!("Selection now holds {} customer(s)", rows.len())
        })
        .on_query_change(|query: &QueryState| info!("Query: {query:?}"))
        .on_confirm(|value: &ReturnValue<Customer>| {
            info!("Confirmed {} customer(s)", value.len())
        });

    let mut lookup = SelectionController::new(config, callbacks)?;
    print_lines("closed", &render(&lookup, &TextSlots));

    lookup.open();
    wait_for_rows(&mut lookup).await?;
    print_lines("opened", &render(&lookup, &TextSlots));

    lookup.update_query(QueryPatch::new().search("an"));
    lookup.sort_by_column("city");
    wait_for_rows(&mut lookup).await?;

    for row in lookup.page_rows().iter().take(4) {
        lookup.toggle_row(row);
    }
    lookup.observe_viewport(12.0, 8.0);
    print_lines("searched, sorted, scrolled", &render(&lookup, &CompactSlots));

    lookup.update_query(QueryPatch::new().page(2));
    wait_for_rows(&mut lookup).await?;
    print_lines("page 2", &render(&lookup, &TextSlots));

    let value = lookup.confirm_selection()?;
    match serde_json::to_string_pretty(&value) {
        Ok(json) => println!("confirmed value:\n{json}"),
        Err(e) => eprintln!("Error: {}", e),
    }
    print_lines("after confirm", &render(&lookup, &TextSlots));
    Ok(())
}
