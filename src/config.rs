use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Конфигурация: список "специальных" процессов, окна которых блокируются
/// барьерами XFixes вместо прямого захвата указателя.
///
/// Формат файла - плоский текст: одно имя процесса на строку, строки с `#`
/// и пустые строки игнорируются. Набор неизменяем после загрузки.
#[derive(Debug, Clone)]
pub struct Config {
    special_processes: HashSet<String>,
}

/// Путь к конфигурации по умолчанию: `~/.config/winlock.conf`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("winlock.conf")
}

const DEFAULT_CONFIG_CONTENTS: &str = "\
# Конфигурация winlock-rust
# Каждая строка - имя процесса, окна которого блокируются барьерами
# (для программ, плохо переносящих прямой захват указателя).
";

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Отсутствие файла не ошибка: создаём заготовку и работаем
        // с пустым набором.
        if !config_path.exists() {
            Self::create_default_file(config_path)?;
            info!(
                "Конфигурация не найдена, создан файл по умолчанию: {}",
                config_path.display()
            );
            return Ok(Self {
                special_processes: HashSet::new(),
            });
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Не удалось прочитать конфигурацию из {:?}", config_path))?;

        let config = Self::parse(&contents);
        config.validate()?;

        info!(
            "Загружено {} специальных процессов из {}",
            config.special_processes.len(),
            config_path.display()
        );

        Ok(config)
    }

    fn create_default_file(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Не удалось создать директорию {:?}", parent))?;
        }
        fs::write(config_path, DEFAULT_CONFIG_CONTENTS)
            .with_context(|| format!("Не удалось создать файл конфигурации {:?}", config_path))
    }

    fn parse(contents: &str) -> Self {
        let special_processes = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Self { special_processes }
    }

    pub fn validate(&self) -> Result<()> {
        for name in &self.special_processes {
            // Сравниваем с базовым именем исполняемого файла, поэтому
            // запись с путём не совпадёт никогда.
            if name.contains('/') {
                anyhow::bail!(
                    "Запись '{}' содержит '/': укажите базовое имя процесса без пути",
                    name
                );
            }
        }
        Ok(())
    }

    /// Точное (регистрозависимое) совпадение имени процесса с записью списка.
    pub fn is_special(&self, process_name: &str) -> bool {
        self.special_processes.contains(process_name)
    }

    pub fn special_process_count(&self) -> usize {
        self.special_processes.len()
    }

    #[cfg(test)]
    pub fn with_special_processes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            special_processes: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            special_processes: HashSet::new(),
        }
    }
}
