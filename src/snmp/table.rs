use std::collections::BTreeMap;

/// Таблица SNMP: колонка -> строка -> значение.
///
/// Собирается из плоского walk по суффиксу `<колонка>.<строка>` каждого OID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Вставляет ячейку; повтор той же пары перезаписывает значение
    pub fn insert(&mut self, column: u32, row: u32, value: String) -> Option<String> {
        self.columns.entry(column).or_default().insert(row, value)
    }

    pub fn get(&self, column: u32, row: u32) -> Option<&str> {
        self.columns.get(&column)?.get(&row).map(String::as_str)
    }

    /// Все индексы строк, встречающиеся хотя бы в одной колонке
    pub fn row_indexes(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self
            .columns
            .values()
            .flat_map(|rows| rows.keys().copied())
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Количество ячеек
    pub fn len(&self) -> usize {
        self.columns.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
