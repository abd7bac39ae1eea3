use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::constants::DEFAULT_FIELDS;

/// Поля подписки по умолчанию
pub fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Чтение полей: по одному на строку, `#` означает комментарий
pub fn read_fields<R: io::Read>(reader: R) -> io::Result<Vec<String>> {
    let mut out = FieldList::default();
    let buf = BufReader::new(reader);

    for line in buf.lines() {
        let line = line?;
        if let Some(f) = normalize_line(&line) {
            out.push(f);
        }
    }

    Ok(out.into_vec())
}

/// Чтение полей из файла
pub fn read_fields_from_path(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let f = File::open(path)?;
    read_fields(f)
}

/// Парсит список полей из строки вида "lp, ch, ,chp".
/// Правила:
/// - разделитель: запятая
/// - trim пробелов, пустые элементы игнорируются
/// - нормализация: ASCII lowercase
/// - дубликаты убираются, порядок первого вхождения сохраняется
pub fn parse_fields_csv(raw: &str) -> Vec<String> {
    let mut out = FieldList::default();

    for part in raw.split(',') {
        let f = part.trim();
        if f.is_empty() {
            continue;
        }
        out.push(f.to_ascii_lowercase());
    }

    out.into_vec()
}

fn normalize_line(line: &str) -> Option<String> {
    // "lp # last price"
    let s = line.split('#').next().unwrap_or("").trim();
    if s.is_empty() {
        return None;
    }

    Some(s.to_ascii_lowercase())
}

// порядок важен только для читаемости запроса, сервер его не требует
#[derive(Default)]
struct FieldList {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl FieldList {
    fn push(&mut self, field: String) {
        if self.seen.insert(field.clone()) {
            self.items.push(field);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}
