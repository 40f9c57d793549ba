//! 命令行定义

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "order_intake")]
#[command(about = "仓库订单入库工具：标签识别、订单查询、出库管理")]
#[command(version)]
pub struct Cli {
    /// TOML 配置文件（会被环境变量覆盖）
    #[arg(short, long, env = "ORDER_INTAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// 输出详细日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 扫描标签图片和/或手动输入订单号，查询并保存
    Intake {
        /// 标签图片
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,

        /// 手动输入的订单号（可重复）
        #[arg(short, long = "order")]
        orders: Vec<String>,

        /// 与 --order 按顺序对应的箱号（可重复）
        #[arg(short, long = "box")]
        boxes: Vec<String>,

        /// 只查询不保存
        #[arg(long)]
        dry_run: bool,
    },

    /// 只解析标签，不查询合作方
    Parse {
        /// 文本文件（每行一条 OCR 结果），配合 --ocr 时为图片
        path: PathBuf,

        /// 先对图片做 OCR
        #[arg(long)]
        ocr: bool,
    },

    /// 按日期范围浏览，缺省为最新日期
    List {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// 按字段搜索，字段或值为空时返回全部
    Search {
        #[arg(long)]
        field: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// 已出库订单
    Shipped {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// 未出库订单
    Unshipped {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// 更新出库状态（"true" 为已出库，其余为未出库）
    Ship { order_number: String, shipped: String },

    /// 更新备注
    Memo {
        order_number: String,
        #[arg(default_value = "")]
        memo: String,
    },

    /// 列出所有存在订单的日期
    Dates,

    /// 给定日期所在周（周日到周六）的订单，缺省为今天
    Week { date: Option<NaiveDate> },

    /// 数据维护
    #[command(subcommand)]
    Maintain(MaintainCommand),
}

#[derive(Subcommand, Debug)]
pub enum MaintainCommand {
    /// 删除重复明细，保留最早的一条
    Dedupe,

    /// 修改订单的入库日期
    Redate {
        #[arg(long)]
        date: NaiveDate,
        #[arg(required = true)]
        orders: Vec<String>,
    },

    /// 删除指定日期的全部明细
    Purge {
        #[arg(required = true)]
        dates: Vec<NaiveDate>,
    },

    /// 手动插入一条明细
    Insert {
        #[arg(long)]
        order_number: String,
        #[arg(long)]
        purchase_order_number: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long = "box")]
        box_label: Option<String>,
        #[arg(long)]
        date: NaiveDate,
    },
}
