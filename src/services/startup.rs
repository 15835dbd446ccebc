use crate::config::AutostartConfig;
use crate::error::Result;
use crate::utils::{expand_home, home_dir};
use serde::Serialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

/// Результат запуска одной команды автозапуска
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Spawned { command: String, pid: u32 },
    Missing { command: String },
    Failed { command: String, error: String },
    Skipped { command: String },
}

impl LaunchOutcome {
    pub fn is_spawned(&self) -> bool {
        matches!(self, LaunchOutcome::Spawned { .. })
    }
}

/// Итог одного прохода автозапуска
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub outcomes: Vec<LaunchOutcome>,
}

impl StartupReport {
    pub fn spawned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_spawned()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.spawned()
    }
}

/// Запускает команды автозапуска по порядку как отсоединённые процессы
/// в собственной группе процессов (SIGINT терминала их не задевает).
///
/// Отсутствующий исполняемый файл не прерывает последовательность:
/// ошибка пишется в лог, следующие команды всё равно запускаются.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSequencer {
    commands: Vec<String>,
    home: PathBuf,
    extra_path: Vec<PathBuf>,
}

impl StartupSequencer {
    pub fn new(commands: Vec<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            commands,
            home: home.into(),
            extra_path: Vec::new(),
        }
    }

    pub fn with_extra_path(mut self, dirs: &[String]) -> Self {
        self.extra_path = dirs
            .iter()
            .map(|dir| PathBuf::from(expand_home(dir, &self.home)))
            .collect();
        self
    }

    pub fn from_config(config: &AutostartConfig) -> Result<Self> {
        let home = home_dir()?;
        Ok(Self::new(config.commands.clone(), home).with_extra_path(&config.extra_path))
    }

    /// Запустить все команды один раз
    pub fn run(&self) -> StartupReport {
        info!("Автозапуск: {} команд", self.commands.len());

        let path = self.child_path();
        let outcomes: Vec<LaunchOutcome> = self
            .commands
            .iter()
            .map(|command| self.launch(command, path.as_ref()))
            .collect();

        let report = StartupReport { outcomes };
        info!(
            "Автозапуск завершён: запущено {}, с ошибками {}",
            report.spawned(),
            report.failed()
        );
        report
    }

    fn launch(&self, command: &str, path: Option<&OsString>) -> LaunchOutcome {
        let mut parts = command
            .split_whitespace()
            .map(|part| expand_home(part, &self.home));

        let Some(program) = parts.next() else {
            warn!("Пустая команда автозапуска пропущена");
            return LaunchOutcome::Skipped {
                command: command.to_string(),
            };
        };

        let mut cmd = Command::new(&program);
        cmd.args(parts)
            .current_dir(&self.home)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);
        if let Some(path) = path {
            cmd.env("PATH", path);
        }

        match cmd.spawn() {
            Ok(mut child) => {
                let pid = child.id();
                debug!("Запущен '{}' (pid {})", command, pid);
                // Процесс живёт сам по себе, но должен быть собран после завершения
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
                LaunchOutcome::Spawned {
                    command: command.to_string(),
                    pid,
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("Не удалось запустить '{}': исполняемый файл не найден", command);
                LaunchOutcome::Missing {
                    command: command.to_string(),
                }
            }
            Err(e) => {
                error!("Не удалось запустить '{}': {}", command, e);
                LaunchOutcome::Failed {
                    command: command.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// PATH для дочерних процессов: текущий PATH + дополнительные каталоги
    fn child_path(&self) -> Option<OsString> {
        if self.extra_path.is_empty() {
            return None;
        }

        let current = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::env::split_paths(&current).chain(self.extra_path.iter().cloned());
        match std::env::join_paths(dirs) {
            Ok(joined) => Some(joined),
            Err(e) => {
                warn!("Не удалось расширить PATH: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    fn wait_for(path: &std::path::Path) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if path.exists() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_missing_executable_does_not_stop_sequence() {
        let home = tempfile::tempdir().unwrap();
        let sequencer = StartupSequencer::new(
            vec![
                "tilecfg-definitely-missing-binary --flag".to_string(),
                "touch started-marker".to_string(),
            ],
            home.path(),
        );

        let report = sequencer.run();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes[0],
            LaunchOutcome::Missing {
                command: "tilecfg-definitely-missing-binary --flag".to_string()
            }
        );
        assert!(report.outcomes[1].is_spawned());
        // Рабочий каталог - домашний
        assert!(wait_for(&home.path().join("started-marker")));
    }

    #[test]
    fn test_home_relative_arguments_are_expanded() {
        let home = tempfile::tempdir().unwrap();
        let sequencer = StartupSequencer::new(vec!["touch ~/expanded".to_string()], home.path());

        let report = sequencer.run();

        assert_eq!(report.spawned(), 1);
        assert!(wait_for(&home.path().join("expanded")));
    }

    #[test]
    fn test_empty_command_is_skipped() {
        let home = tempfile::tempdir().unwrap();
        let report = StartupSequencer::new(vec!["   ".to_string()], home.path()).run();

        assert!(matches!(report.outcomes[0], LaunchOutcome::Skipped { .. }));
        assert_eq!(report.failed(), 1);
    }

    /// Поле pgrp из /proc/<pid>/stat
    fn process_group_of(pid: &str) -> u32 {
        let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).unwrap();
        let after_name = &stat[stat.rfind(')').unwrap() + 1..];
        after_name.split_whitespace().nth(2).unwrap().parse().unwrap()
    }

    #[test]
    fn test_children_get_their_own_process_group() {
        let home = tempfile::tempdir().unwrap();
        let report = StartupSequencer::new(vec!["sleep 5".to_string()], home.path()).run();

        let LaunchOutcome::Spawned { pid, .. } = &report.outcomes[0] else {
            panic!("ожидался запущенный процесс: {:?}", report.outcomes[0]);
        };
        let child_group = process_group_of(&pid.to_string());

        assert_eq!(child_group, *pid);
        assert_ne!(child_group, process_group_of("self"));
    }

    #[test]
    fn test_program_found_only_in_extra_path() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join(".local/bin");
        std::fs::create_dir_all(&bin).unwrap();

        let tool = bin.join("tilecfg-extra-path-tool");
        std::fs::write(&tool, "#!/bin/sh\ntouch extra-path-marker\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let without = StartupSequencer::new(vec!["tilecfg-extra-path-tool".to_string()], home.path()).run();
        assert!(matches!(without.outcomes[0], LaunchOutcome::Missing { .. }));

        let report = StartupSequencer::new(vec!["tilecfg-extra-path-tool".to_string()], home.path())
            .with_extra_path(&["~/.local/bin".to_string()])
            .run();

        assert_eq!(report.spawned(), 1);
        assert!(wait_for(&home.path().join("extra-path-marker")));
    }

    #[test]
    fn test_extra_path_is_home_expanded() {
        let sequencer = StartupSequencer::new(vec![], "/home/user")
            .with_extra_path(&["~/.local/bin".to_string()]);

        let path = sequencer.child_path().unwrap();
        let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
        assert_eq!(dirs.last(), Some(&PathBuf::from("/home/user/.local/bin")));
    }
}
