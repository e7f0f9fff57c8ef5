use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::error::SnmpError;

/// Object Identifier: упорядоченная последовательность неотрицательных чисел.
///
/// Помнит, была ли во входной строке ведущая точка, чтобы `parse` -> `to_string`
/// возвращал исходную запись. Сравнение, порядок и хэш считаются только по числам.
#[derive(Debug, Clone)]
pub struct Oid {
    arcs: Vec<u32>,
    leading_dot: bool,
}

impl Oid {
    /// Парсит строку вида `.1.3.6.1.4.1.231` или `1.3.6.1.4.1.231`
    pub fn parse(s: &str) -> Result<Self, SnmpError> {
        let trimmed = s.trim();
        let (leading_dot, body) = match trimmed.strip_prefix('.') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if body.is_empty() {
            return Err(SnmpError::InvalidOid {
                input: s.to_string(),
                reason: "empty OID".to_string(),
            });
        }

        let arcs = body
            .split('.')
            .map(|part| {
                part.parse::<u32>().map_err(|e| SnmpError::InvalidOid {
                    input: s.to_string(),
                    reason: format!("bad component '{}': {}", part, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { arcs, leading_dot })
    }

    /// Та же запись, но с ведущей точкой (форма MIB ServerView)
    pub fn with_leading_dot(mut self) -> Self {
        self.leading_dot = true;
        self
    }

    /// true, если `child` начинается со всех компонентов `self` (включая `child == self`)
    pub fn is_prefix_of(&self, child: &Oid) -> bool {
        child.arcs.len() >= self.arcs.len() && child.arcs[..self.arcs.len()] == self.arcs[..]
    }

    /// Строгий потомок: префикс совпадает и есть хотя бы один компонент сверху
    pub fn is_strict_prefix_of(&self, child: &Oid) -> bool {
        child.arcs.len() > self.arcs.len() && self.is_prefix_of(child)
    }

    /// `(колонка, строка)` из двух последних компонентов
    pub fn table_cell(&self) -> Option<(u32, u32)> {
        match self.arcs.as_slice() {
            [.., column, row] => Some((*column, *row)),
            _ => None,
        }
    }

    /// Конвертация в OID библиотеки snmp2 для отправки по сети
    pub fn to_wire(&self) -> Result<snmp2::Oid<'static>, SnmpError> {
        let parts: Vec<u64> = self.arcs.iter().map(|&arc| u64::from(arc)).collect();
        snmp2::Oid::from(&parts).map_err(|e| SnmpError::InvalidOid {
            input: self.to_string(),
            reason: format!("{:?}", e),
        })
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 || self.leading_dot {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::parse(s)
    }
}

impl PartialEq for Oid {
    fn eq(&self, other: &Self) -> bool {
        self.arcs == other.arcs
    }
}

impl Eq for Oid {}

impl Hash for Oid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arcs.hash(state);
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arcs.cmp(&other.arcs)
    }
}
