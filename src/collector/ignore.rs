/// Подсистемы, которые оператор попросил не учитывать (в нижнем регистре).
///
/// Внимание: из сводки имена вырезаются как подстроки, поэтому `fan`
/// вырежет и кусок из `fan2`. Список проблем сравнивает имена целиком.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: Vec<String>,
}

impl IgnoreList {
    /// Разбирает значение опции `-i`: `name1,name2,...`
    pub fn parse(value: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in value.to_lowercase().split(',').map(str::trim) {
            if !name.is_empty() && !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Точное совпадение имени без учета регистра
    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.iter().any(|ignored| *ignored == name)
    }

    /// Переводит строку имен в нижний регистр и вырезает каждое игнорируемое имя как подстроку
    pub fn strip_from(&self, names_blob: &str) -> String {
        self.names
            .iter()
            .fold(names_blob.to_lowercase(), |blob, ignored| {
                blob.replace(ignored.as_str(), "")
            })
    }

    /// Сводка для вывода: оставшиеся имена через запятую, по алфавиту
    pub fn summarize(&self, names_blob: &str) -> String {
        let stripped = self.strip_from(names_blob);
        let mut tokens: Vec<&str> = stripped.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(",")
    }
}
