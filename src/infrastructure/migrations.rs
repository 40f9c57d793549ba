use crate::error::AppResult;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::info;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_number TEXT NOT NULL,
    purchase_order_number TEXT,
    product_description TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    box TEXT,
    created_at DATE DEFAULT (DATE('now')),
    shipped INTEGER DEFAULT 0,
    memo TEXT DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_order_number ON orders (order_number);
CREATE INDEX IF NOT EXISTS idx_created_at ON orders (created_at);
";

/// 后来追加的列：旧库里可能缺失
const ADDED_COLUMNS: &[(&str, &str)] = &[
    ("shipped", "ALTER TABLE orders ADD COLUMN shipped INTEGER DEFAULT 0"),
    ("memo", "ALTER TABLE orders ADD COLUMN memo TEXT DEFAULT ''"),
];

/// 建表并补齐缺失的列，可重复执行
pub fn run_migrations(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA_V1)?;

    let columns = table_columns(conn, "orders")?;
    for (column, alter_sql) in ADDED_COLUMNS {
        if !columns.contains(*column) {
            conn.execute(alter_sql, [])?;
            info!("✅ 已添加 '{}' 列", column);
        }
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> AppResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_orders_table() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let columns = table_columns(&conn, "orders").unwrap();
        for expected in [
            "id",
            "order_number",
            "purchase_order_number",
            "product_description",
            "quantity",
            "box",
            "created_at",
            "shipped",
            "memo",
        ] {
            assert!(columns.contains(expected), "missing column {}", expected);
        }
    }

    #[test]
    fn test_migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn test_migration_upgrades_legacy_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_number TEXT NOT NULL,
                purchase_order_number TEXT,
                product_description TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                box TEXT,
                created_at DATE DEFAULT (DATE('now'))
            );
            INSERT INTO orders (order_number, product_description, quantity, created_at)
            VALUES ('1016031605', 'PowerEdge R760', 2, '2025-02-07');",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let (shipped, memo): (i64, String) = conn
            .query_row("SELECT shipped, memo FROM orders", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(shipped, 0);
        assert_eq!(memo, "");
    }
}
