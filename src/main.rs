// ==========================================
// 教室容量分配系统 - 命令行入口
// ==========================================
// 用法: class-optima [--db PATH] [--lang zh-CN|en] <command> [args...]
// 命令列表见 locales/*.yml 的 cli.usage
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use class_optima::db::get_default_db_path;
use class_optima::i18n::{self, SUPPORTED_LOCALES};
use class_optima::{AllocationApi, AllocationStrategy, AnalyzeMode, CategoryFilter, RoomId};
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    class_optima::logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(lang) = take_option(&mut args, "--lang")? {
        if !i18n::set_locale(&lang) {
            let supported = SUPPORTED_LOCALES.join(", ");
            bail!(
                "{}",
                i18n::t_with_args(
                    "cli.unsupported_locale",
                    &[("locale", lang.as_str()), ("supported", supported.as_str())],
                )
            );
        }
    }
    let db_path = match take_option(&mut args, "--db")? {
        Some(path) => path,
        None => get_default_db_path(),
    };

    let Some(command) = args.first().cloned() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    tracing::info!(
        version = class_optima::VERSION,
        db_path = %db_path,
        locale = %i18n::current_locale(),
        command = %command,
        "{}",
        class_optima::APP_NAME
    );
    let mut api = AllocationApi::open(&db_path).context("无法打开数据库")?;

    match command.as_str() {
        "rooms" => {
            let filter = match rest.first() {
                Some(raw) => CategoryFilter::from_str(raw)
                    .ok_or_else(|| anyhow!("未知类别: {}", raw))?,
                None => CategoryFilter::All,
            };
            print_json(&api.room_views(filter)?)?;
        }
        "analyze" => {
            let count = arg(rest, 0, "count")?;
            let mode = parse_mode(rest.get(1))?;
            print_json(&api.analyze(count, mode)?)?;
        }
        "add-here" => {
            let room_id = parse_room_id(arg(rest, 0, "room_id")?)?;
            let count = arg(rest, 1, "count")?;
            let mode = parse_mode(rest.get(2))?;
            api.analyze(count, mode)?;
            print_json(&api.add_here(room_id)?)?;
        }
        "direct" => {
            let room_id = parse_room_id(arg(rest, 0, "room_id")?)?;
            let count = arg(rest, 1, "count")?;
            print_json(&api.allocate(count, AllocationStrategy::Direct { room_id })?)?;
        }
        "split" => {
            let room_id = parse_room_id(arg(rest, 0, "room_id")?)?;
            let count = arg(rest, 1, "count")?;
            let next_room = parse_room_id(arg(rest, 2, "next_room")?)?;
            let first = api.allocate(count, AllocationStrategy::Direct { room_id })?;
            if api.pending().is_some() {
                print_json(&api.retarget_pending(next_room)?)?;
            } else {
                print_json(&first)?;
            }
        }
        "waterfall" => {
            let count = arg(rest, 0, "count")?;
            let start = rest.get(1).map(|raw| parse_room_id(raw)).transpose()?;
            print_json(&api.allocate(count, AllocationStrategy::Waterfall { start })?)?;
        }
        "best-fit" => {
            let count = arg(rest, 0, "count")?;
            print_json(&api.allocate(count, AllocationStrategy::BestFit)?)?;
        }
        "allocate" => {
            let count = arg(rest, 0, "count")?;
            print_json(&api.allocate_default(count)?)?;
        }
        "set" => {
            let room_id = parse_room_id(arg(rest, 0, "room_id")?)?;
            let raw = arg(rest, 1, "value")?;
            let value: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("人数必须为整数: {}", raw))?;
            print_json(&api.set_occupancy(room_id, value)?)?;
        }
        "switch-session" => {
            print_json(&api.switch_session()?)?;
        }
        "anomalies" => {
            print_json(&api.capacity_anomalies())?;
        }
        "history" => {
            let limit = match rest.first() {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("limit 必须为正整数: {}", raw))?,
                None => 20,
            };
            print_json(&api.persisted_history(limit)?)?;
        }
        "import" => {
            let path = arg(rest, 0, "csv_path")?;
            print_json(&api.import_catalog(Path::new(path))?)?;
        }
        other => {
            print_usage();
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}

/// 取出 `--name value` 选项（从参数列表中移除）
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(idx) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if idx + 1 >= args.len() {
        bail!("{} 需要指定参数值", name);
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Ok(Some(value))
}

fn arg<'a>(rest: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    rest.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("缺少参数: {}", name))
}

fn parse_room_id(raw: &str) -> Result<RoomId> {
    raw.trim()
        .parse()
        .with_context(|| format!("教室编号必须为正整数: {}", raw))
}

fn parse_mode(raw: Option<&String>) -> Result<AnalyzeMode> {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("exact") => Ok(AnalyzeMode::ExactFit),
        Some("any") => Ok(AnalyzeMode::AnySpace),
        Some(other) => bail!("未知分析模式: {}（exact / any）", other),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_usage() {
    eprint!("{}", i18n::t("cli.usage"));
}
