//! 文字 CLI：读取 stdin → 解析命令 → 执行并打印

use bevy::app::AppExit;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::num::NonZero;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::KeyName;
use crate::core::context::IntegrationContext;
use crate::core::{events::LogEvent, states::AppState};
use crate::data::{ItemCatalog, LoadReport};
use crate::host::HostBridge;
use crate::inventory::ItemLocator;
use crate::reroll::components::RerollPass;
use crate::reroll::events::{KeyPressed, RebindKey, RerollRequested};

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_back(line.to_string());
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands.run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
pub struct CliLine(pub String);

/// 我们支持的命令
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Status,
    Exit,
    Catalog(Option<i32>), // None=全部；Some(id)=查询单个
    Balance,
    Scan,
    Press(String),
    Reroll,
    Rebind(String),
    Unsupported(String),
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

#[allow(clippy::too_many_arguments)]
fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut app_exit: EventWriter<AppExit>,
    mut log: EventWriter<LogEvent>,
    state: Res<State<AppState>>,
    catalog: Res<ItemCatalog>,
    report: Option<Res<LoadReport>>,
    pass: Option<Res<RerollPass>>,
    mut ctx: ResMut<IntegrationContext>,
    mut host: Option<ResMut<HostBridge>>,
    config: Res<crate::config::RerollConfig>,
    mut ev_key: EventWriter<KeyPressed>,
    mut ev_reroll: EventWriter<RerollRequested>,
    mut ev_rebind: EventWriter<RebindKey>,
) {
    for CliLine(input) in line_reader.read() {
        match parse_command(input) {
            Command::Help => {
                log.write(LogEvent(
                    "Commands:
  help                   show this list
  status                 key, cost and pass progress
  exit / quit            quit
  catalog                list every rollable item
  catalog <id>           show one catalog entry
  balance                read the bound currency
  scan                   classify items in the scene
  press <KEY>            simulate a key press
  reroll                 start a pass without the key
  rebind <KEY>           change the reroll key
  ".into()));
            }

            Command::Status => {
                let progress = pass.as_ref().map_or("idle".to_string(), |p| {
                    format!("pass {} {}/{}", p.id, p.processed(), p.total)
                });
                log.write(LogEvent(format!(
                    "State: {:?}, Items: {}, Key: {}, Cost: {}{}, {progress}",
                    state.get(),
                    catalog.len(),
                    ctx.trigger(),
                    ctx.ledger.charge_amount(),
                    if config.use_cost { "" } else { " (disabled)" },
                )));
                if let Some(report) = &report {
                    log.write(LogEvent(format!("Load report: {:?}", **report)));
                }
            }

            Command::Exit => {
                log.write(LogEvent("Bye~".into()));
                app_exit.write(AppExit::Error(NonZero::<u8>::MIN));
            }

            Command::Catalog(None) => {
                for id in catalog.ids() {
                    log.write(LogEvent(format!(
                        "{} | {} | max {}",
                        uuid_from_id(*id),
                        id,
                        catalog.max_stack(*id)
                    )));
                }
            }

            Command::Catalog(Some(id)) => {
                if catalog.contains(id) {
                    log.write(LogEvent(format!(
                        "==================================================
UUID : {}
ID   : {id}
Max  : {}
==================================================",
                        uuid_from_id(id),
                        catalog.max_stack(id)
                    )));
                } else {
                    log.write(LogEvent(format!("Item {id} is not rollable")));
                }
            }

            Command::Balance => {
                let balance = host
                    .as_mut()
                    .and_then(|h| ctx.balance(h.model_mut()));
                let via = ctx
                    .currency
                    .binding()
                    .map_or("unbound".to_string(), |b| format!("{:?}", b.via));
                match balance {
                    Some(v) => log.write(LogEvent(format!("Balance: {v} (via {via})"))),
                    None => log.write(LogEvent("Currency not available".into())),
                };
            }

            Command::Scan => {
                let Some(host) = host.as_ref() else {
                    log.write(LogEvent("No host attached".into()));
                    continue;
                };
                let ctx = &mut *ctx;
                let result = ItemLocator::new(&config.host.catalog, &config.host.container)
                    .locate(host.model(), &mut ctx.types);
                match result {
                    Ok(found) => {
                        log.write(LogEvent(
                            serde_json::to_string(&found).unwrap_or_else(|_| found.summary()),
                        ));
                    }
                    Err(e) => {
                        log.write(LogEvent(format!("Scan failed: {e}")));
                    }
                }
            }

            Command::Press(key) => {
                ev_key.write(KeyPressed(key));
            }

            Command::Reroll => {
                ev_reroll.write(RerollRequested);
            }

            Command::Rebind(raw) => match KeyName::parse(&raw) {
                Ok(key) => {
                    ev_rebind.write(RebindKey(key));
                }
                Err(e) => {
                    log.write(LogEvent(format!("{e}")));
                }
            },

            Command::Unsupported(cmd) => {
                log.write(LogEvent(format!("Unsupported command: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "catalog" | "items" | "c" => {
            match parts.next() {
                Some(token) => match token.parse() {
                    Ok(id) => Command::Catalog(Some(id)),
                    Err(_) => Command::Unsupported(format!("catalog {token}")),
                },
                None => Command::Catalog(None),
            }
        }
        "balance" | "b" => Command::Balance,
        "scan" => Command::Scan,
        "press" | "key" => Command::Press(parts.next().unwrap_or("").to_string()),
        "reroll" | "r" => Command::Reroll,
        "rebind" => Command::Rebind(parts.next().unwrap_or("").to_string()),
        other => Command::Unsupported(other.into()),
    }
}

fn uuid_from_id(id: i32) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &id.to_le_bytes())
}
