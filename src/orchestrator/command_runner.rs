//! 命令分发 - 编排层
//!
//! 把命令行子命令映射到应用能力，结果统一转成 JSON

use crate::cli::{Command, MaintainCommand};
use crate::clients::{OrderLookup, TextDetector};
use crate::error::{AppError, AppResult};
use crate::models::NewLineItem;
use crate::orchestrator::batch_processor::{App, IntakeRequest};
use crate::services::week_range;
use serde_json::{json, Value};
use tracing::info;

/// 执行一条命令
///
/// # 参数
/// - `app`: 已初始化的应用
/// - `command`: 命令行子命令
///
/// # 返回
/// 命令结果（JSON）
pub async fn run_command<D: TextDetector, L: OrderLookup>(app: &App<D, L>, command: Command) -> AppResult<Value> {
    let today = chrono::Local::now().date_naive();

    let result = match command {
        Command::Intake {
            images,
            orders,
            boxes,
            dry_run,
        } => {
            let request = IntakeRequest {
                images,
                manual_orders: orders,
                boxes,
                save: !dry_run,
            };
            serde_json::to_value(app.intake(request).await?)?
        }

        Command::Parse { path, ocr } => {
            let lines = if ocr {
                app.flow().recognize(&path).await?
            } else {
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
                content.lines().map(str::to_string).collect()
            };
            serde_json::to_value(app.flow().parser().parse(&lines))?
        }

        Command::List { start, end } => serde_json::to_value(app.query().list_range(start, end, today)?)?,

        Command::Search { field, value, page } => {
            serde_json::to_value(app.query().search(field.as_deref(), value.as_deref(), page)?)?
        }

        Command::Shipped { page } => serde_json::to_value(app.query().by_shipped(true, page)?)?,

        Command::Unshipped { page } => serde_json::to_value(app.query().by_shipped(false, page)?)?,

        Command::Ship {
            order_number,
            shipped,
        } => {
            let shipped = parse_shipped_flag(&shipped);
            let updated = app.store().update_shipped(&order_number, shipped)?;
            json!({ "order_number": order_number, "shipped": shipped, "updated": updated })
        }

        Command::Memo { order_number, memo } => {
            let updated = app.store().update_memo(&order_number, &memo)?;
            json!({ "order_number": order_number, "memo": memo, "updated": updated })
        }

        Command::Dates => serde_json::to_value(app.store().available_dates()?)?,

        Command::Week { date } => {
            let (start, end) = week_range(date.unwrap_or(today));
            serde_json::to_value(app.query().list_range(Some(start), Some(end), today)?)?
        }

        Command::Maintain(maintain) => run_maintenance(app, maintain)?,
    };

    Ok(result)
}

fn run_maintenance<D: TextDetector, L: OrderLookup>(app: &App<D, L>, command: MaintainCommand) -> AppResult<Value> {
    let store = app.store();

    let result = match command {
        MaintainCommand::Dedupe => json!({ "deleted": store.remove_duplicates()? }),

        MaintainCommand::Redate { date, orders } => {
            json!({ "updated": store.reassign_created_at(&orders, date)? })
        }

        MaintainCommand::Purge { dates } => json!({ "deleted": store.delete_by_dates(&dates)? }),

        MaintainCommand::Insert {
            order_number,
            purchase_order_number,
            description,
            quantity,
            box_label,
            date,
        } => {
            let item = NewLineItem {
                order_number,
                purchase_order_number,
                product_description: description,
                quantity,
                box_label,
                created_at: date,
            };
            let id = store.insert_line_item(&item)?;
            info!("✅ 已插入明细 #{}: {}", id, item.order_number);
            json!({ "id": id })
        }
    };

    Ok(result)
}

/// 出库标记只认 "true"
fn parse_shipped_flag(value: &str) -> bool {
    value == "true"
}
