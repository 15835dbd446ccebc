use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
pub mod mappings;
mod matching;
mod services;
mod utils;

use config::{Config, Preset};
use events::{HookEvent, WindowInfo};
use services::key_bindings::find_shadowed;
use services::{create_event_source, HookOutcome, HookRegistry, Session, StartupSequencer};

#[derive(Parser, Debug)]
#[command(name = "tilecfg")]
#[command(version)]
#[command(about = "Сборка и проверка конфигурации тайлового оконного менеджера")]
struct Args {
    /// Путь к файлу конфигурации (по умолчанию ~/.config/tilecfg/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Встроенный пресет, поверх которого применяется файл
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Уровень логирования (перекрывает logging.level и logging.filter)
    #[arg(long)]
    log_level: Option<String>,

    /// Режим сухого запуска (без запуска процессов, события эмулируются)
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Проверить конфигурацию и вывести сводку
    Check,
    /// Вывести собранную конфигурацию в JSON
    Dump,
    /// Действующие привязки клавиш
    Keys {
        /// Показать и затенённые привязки
        #[arg(long)]
        all: bool,
    },
    /// Определить группу и плавающий режим для окна
    Classify(ClassifyArgs),
    /// Выполнить автозапуск один раз
    Autostart,
    /// Обрабатывать события рантайма (JSON строки из stdin)
    Run,
}

#[derive(clap::Args, Debug)]
struct ClassifyArgs {
    /// WM_CLASS, можно указать несколько раз
    #[arg(long = "class", required = true)]
    classes: Vec<String>,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long = "type")]
    wm_type: Option<String>,

    #[arg(long)]
    transient: bool,

    #[arg(long)]
    fixed_size: bool,

    #[arg(long)]
    fixed_ratio: bool,

    #[arg(long)]
    pid: Option<u32>,
}

impl ClassifyArgs {
    fn window(&self) -> WindowInfo {
        let mut window = self
            .classes
            .iter()
            .fold(WindowInfo::new(self.title.as_str()), |window, class| window.with_class(class.as_str()))
            .with_fixed_size(self.fixed_size)
            .with_fixed_ratio(self.fixed_ratio);

        if let Some(wm_type) = &self.wm_type {
            window = window.with_type(wm_type.as_str());
        }
        if self.transient {
            // рантайм передаёт id родителя, здесь достаточно факта
            window = window.with_transient_for(0);
        }
        if let Some(pid) = self.pid {
            window = window.with_pid(pid);
        }
        window
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let preset = args.preset;

    // Загрузка конфигурации (до логирования: формат логов задаётся в ней)
    let config = Config::load(&config_path, preset)?;
    init_tracing(&args, &config)?;

    info!("Запуск tilecfg v{}", env!("CARGO_PKG_VERSION"));
    if let Some(notice) = missing_config_notice(&config_path, preset) {
        warn!("{}", notice);
    }
    info!("Конфигурация загружена из: {:?} (пресет {})", config_path, preset);

    if args.dry_run {
        warn!("Режим сухого запуска - процессы не запускаются");
    }

    let session = Arc::new(Session::with_initial(&config, move || {
        Config::load(&config_path, preset)
    })?);

    match &args.command {
        Command::Check => print_summary(&session),
        Command::Dump => {
            println!("{}", serde_json::to_string_pretty(&*session.current())?);
        }
        Command::Keys { all } => print_keys(&session, *all),
        Command::Classify(classify) => {
            let window = classify.window();
            let placement = HookRegistry::with_defaults(true).client_new(&session.current(), &window);
            println!("{}", serde_json::to_string_pretty(&placement)?);
        }
        Command::Autostart => {
            let config = session.current();
            if args.dry_run {
                for command in &config.autostart.commands {
                    println!("{}", command);
                }
            } else {
                let report = StartupSequencer::from_config(&config.autostart)?.run();
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Command::Run => run_hooks(session, args.dry_run).await?,
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("tilecfg").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("tilecfg.toml"))
}

/// Отсутствующий файл не ошибка: остаётся пресет
fn missing_config_notice(config_path: &Path, preset: Preset) -> Option<String> {
    (!config_path.exists()).then(|| {
        format!(
            "Файл конфигурации {:?} не найден, используется пресет '{}'",
            config_path, preset
        )
    })
}

fn print_summary(session: &Session) {
    let config = session.current();
    let effective = config.effective_keys().len();

    println!("Конфигурация корректна");
    println!("  модификатор:       {}", config.modifier.as_str());
    println!("  терминал:          {}", config.terminal);
    println!(
        "  привязки клавиш:   {} (действующих {}, затенено {})",
        config.keys.len(),
        effective,
        config.keys.len() - effective
    );
    println!(
        "  группы:            {}",
        config
            .groups
            .iter()
            .map(|g| format!("{} [{}]", g.name, g.display_label()))
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!(
        "  макеты:            {}",
        config.layouts.iter().map(|l| l.name.as_str()).collect::<Vec<_>>().join(", ")
    );
    println!("  плавающие правила: {}", config.floating.rules.len());
    for bar in config.bars() {
        println!("  панель:            {:?}, {} виджетов", bar.position, bar.widgets.len());
    }
    println!("  привязки мыши:     {}", config.mouse.len());
    println!("  автозапуск:        {} команд", config.autostart.commands.len());
}

fn print_keys(session: &Session, all: bool) {
    let config = session.current();
    let shadowed: Vec<usize> = find_shadowed(&config.keys).into_iter().map(|(old, _)| old).collect();

    for (index, binding) in config.keys.iter().enumerate() {
        let is_shadowed = shadowed.contains(&index);
        if is_shadowed && !all {
            continue;
        }
        println!(
            "{:<28} {:<40} {}{}",
            binding.combination_id(),
            binding.action.to_string(),
            binding.desc,
            if is_shadowed { " (затенена)" } else { "" }
        );
    }
}

/// Цикл обработки событий: startup_once, затем события источника до его исчерпания или Ctrl+C.
/// SIGHUP и событие `reload` перезагружают конфигурацию.
async fn run_hooks(session: Arc<Session>, dry_run: bool) -> Result<()> {
    let registry = HookRegistry::with_defaults(dry_run);

    if let Some(outcome) = registry.dispatch(&session.current(), &HookEvent::StartupOnce) {
        print_outcome(&outcome)?;
    }

    let (tx, mut rx) = mpsc::channel(64);
    let source = create_event_source(dry_run);
    let source_handle = tokio::spawn(async move {
        if let Err(e) = source.run(tx).await {
            error!("Ошибка в источнике событий: {}", e);
        }
    });

    let mut hangup = unix_signal(SignalKind::hangup())?;

    info!("Обработка событий запущена");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(HookEvent::Reload) => print_outcome(&reload(&session))?,
                Some(event) => {
                    let config = session.current();
                    if let Some(outcome) = registry.dispatch(&config, &event) {
                        print_outcome(&outcome)?;
                    }
                }
                None => {
                    info!("Источник событий завершён");
                    break;
                }
            },
            _ = hangup.recv() => {
                info!("Получен SIGHUP");
                print_outcome(&reload(&session))?;
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
        }
    }

    source_handle.abort();
    info!("tilecfg завершил работу");
    Ok(())
}

fn reload(session: &Session) -> HookOutcome {
    let error = session.reload().err().map(|e| e.to_string());
    HookOutcome::Reload {
        ok: error.is_none(),
        generation: session.generation(),
        error,
    }
}

fn print_outcome(outcome: &HookOutcome) -> Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}

fn init_tracing(args: &Args, config: &Config) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directives = match &args.log_level {
        Some(level) => level.clone(),
        None if config.logging.filter.is_empty() => config.logging.level.clone(),
        None => format!("{},{}", config.logging.level, config.logging.filter),
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directives))?;

    // Логи в stderr: stdout занят выводом команд
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "pretty" {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
