use chrono::NaiveDate;
use order_intake::cli::{Command, MaintainCommand};
use order_intake::infrastructure::RowFilter;
use order_intake::models::{LookupStatus, NewLineItem, OrderDetails, ProductLine};
use order_intake::{run_command, App, Config, OrderAggregator, OrderStore};
use serde_json::Value;
use tempfile::TempDir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn details(order_number: &str, box_label: &str, products: &[(&str, i64)]) -> OrderDetails {
    OrderDetails {
        order_number: order_number.to_string(),
        purchase_order_number: format!("PO-{}", order_number),
        products: products.iter().map(|(d, q)| ProductLine::new(*d, *q)).collect(),
        box_label: Some(box_label.to_string()),
        status: LookupStatus::Found,
    }
}

fn app_with_orders(dir: &TempDir) -> App {
    let config = Config {
        db_path: dir.path().join("data").join("orders.db").display().to_string(),
        items_per_page: 2,
        ..Config::default()
    };
    let app = App::initialize(config).unwrap();

    let store = app.store();
    store
        .save_orders(&[details("1000000001", "1", &[("R760", 2), ("Rail", 2)])], ymd(2025, 3, 2))
        .unwrap();
    store
        .save_orders(
            &[
                details("1000000002", "2", &[("R660", 1)]),
                details("1000000003", "3", &[("PERC", 4)]),
            ],
            ymd(2025, 3, 5),
        )
        .unwrap();
    store
        .save_orders(&[details("1000000004", "4", &[("R760", 1)])], ymd(2025, 3, 9))
        .unwrap();
    app
}

fn order_numbers(orders: &Value) -> Vec<String> {
    orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["order_number"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_rows_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.db");

    {
        let store = OrderStore::open(&path).unwrap();
        store
            .save_orders(&[details("1016031605", "2", &[("R760", 2)])], ymd(2025, 2, 7))
            .unwrap();
    }

    let store = OrderStore::open(&path).unwrap();
    let rows = store.fetch_rows(&RowFilter::All).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at, Some(ymd(2025, 2, 7)));

    let orders = OrderAggregator::aggregate(&rows);
    assert_eq!(orders[0].products, vec![ProductLine::new("R760", 2)]);
}

#[tokio::test]
async fn test_list_and_week_commands() {
    let dir = TempDir::new().unwrap();
    let app = app_with_orders(&dir);

    let latest = run_command(&app, Command::List { start: None, end: None })
        .await
        .unwrap();
    assert_eq!(latest["start_date"], "2025-03-09");
    assert_eq!(order_numbers(&latest["orders"]), vec!["1000000004"]);
    assert_eq!(latest["available_dates"].as_array().unwrap().len(), 3);

    let week = run_command(&app, Command::Week { date: Some(ymd(2025, 3, 5)) })
        .await
        .unwrap();
    assert_eq!(week["start_date"], "2025-03-02");
    assert_eq!(week["end_date"], "2025-03-08");
    // 同一天内按 id 倒序
    assert_eq!(
        order_numbers(&week["orders"]),
        vec!["1000000003", "1000000002", "1000000001"]
    );
    assert_eq!(week["orders"][2]["products"][1]["itemQuantity"], 2);
}

#[tokio::test]
async fn test_search_pages_over_aggregated_orders() {
    let dir = TempDir::new().unwrap();
    let app = app_with_orders(&dir);

    let page = run_command(
        &app,
        Command::Search {
            field: Some("product_description".to_string()),
            value: Some("R7".to_string()),
            page: 1,
        },
    )
    .await
    .unwrap();
    assert_eq!(page["total_items"], 2);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(order_numbers(&page["items"]), vec!["1000000004", "1000000001"]);

    let all = run_command(
        &app,
        Command::Search {
            field: None,
            value: None,
            page: 2,
        },
    )
    .await
    .unwrap();
    assert_eq!(all["total_items"], 4);
    assert_eq!(all["page"], 2);
    assert_eq!(order_numbers(&all["items"]), vec!["1000000002", "1000000001"]);
}

#[tokio::test]
async fn test_ship_and_memo_commands() {
    let dir = TempDir::new().unwrap();
    let app = app_with_orders(&dir);

    let result = run_command(
        &app,
        Command::Ship {
            order_number: "1000000001".to_string(),
            shipped: "true".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(result["updated"], 2);

    run_command(
        &app,
        Command::Memo {
            order_number: "1000000001".to_string(),
            memo: "오후 출고".to_string(),
        },
    )
    .await
    .unwrap();

    let shipped = run_command(&app, Command::Shipped { page: 1 }).await.unwrap();
    assert_eq!(order_numbers(&shipped["items"]), vec!["1000000001"]);
    assert_eq!(shipped["items"][0]["memo"], "오후 출고");
    assert_eq!(shipped["items"][0]["shipped"], true);

    let unshipped = run_command(&app, Command::Unshipped { page: 1 }).await.unwrap();
    assert_eq!(unshipped["total_items"], 3);

    run_command(
        &app,
        Command::Ship {
            order_number: "1000000001".to_string(),
            shipped: "false".to_string(),
        },
    )
    .await
    .unwrap();
    let shipped = run_command(&app, Command::Shipped { page: 1 }).await.unwrap();
    assert_eq!(shipped["total_items"], 0);
}

#[tokio::test]
async fn test_maintenance_commands() {
    let dir = TempDir::new().unwrap();
    let app = app_with_orders(&dir);

    let duplicate = NewLineItem {
        order_number: "1000000002".to_string(),
        purchase_order_number: Some("PO-1000000002".to_string()),
        product_description: "R660".to_string(),
        quantity: 1,
        box_label: Some("2".to_string()),
        created_at: ymd(2025, 3, 5),
    };
    app.store().insert_line_item(&duplicate).unwrap();

    let dedupe = run_command(&app, Command::Maintain(MaintainCommand::Dedupe))
        .await
        .unwrap();
    assert_eq!(dedupe["deleted"], 1);

    let redate = run_command(
        &app,
        Command::Maintain(MaintainCommand::Redate {
            date: ymd(2025, 3, 9),
            orders: vec!["1000000001".to_string()],
        }),
    )
    .await
    .unwrap();
    assert_eq!(redate["updated"], 2);

    let purge = run_command(
        &app,
        Command::Maintain(MaintainCommand::Purge {
            dates: vec![ymd(2025, 3, 9)],
        }),
    )
    .await
    .unwrap();
    assert_eq!(purge["deleted"], 3);

    let dates = run_command(&app, Command::Dates).await.unwrap();
    assert_eq!(dates, serde_json::json!(["2025-03-05"]));
}

#[tokio::test]
async fn test_parse_command_reads_text_lines() {
    let dir = TempDir::new().unwrap();
    let app = app_with_orders(&dir);
    let lines = dir.path().join("label.txt");
    std::fs::write(&lines, "Order No: 1016031605\nBox 1 of 2\n").unwrap();

    let parsed = run_command(&app, Command::Parse { path: lines, ocr: false })
        .await
        .unwrap();

    assert_eq!(parsed, serde_json::json!([{"order_number": "1016031605", "box": 2}]));
}
