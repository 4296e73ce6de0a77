use crate::common::*;

#[derive(Debug, Clone, Deserialize)]
struct TableRow {
    first: i64,
    second: i64,
    #[serde(default)]
    attributes: String,
}

/// Part indices that tell two classes apart, keyed by an ordered class pair.
#[derive(Debug, Clone, Default)]
pub struct CommonAttributeTable {
    entries: HashMap<(i64, i64), Vec<usize>>,
}

impl CommonAttributeTable {
    /// Reads a CSV file with `first,second,attributes` columns, where
    /// `attributes` is a space separated list of part indices.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("failed to open attribute table '{}'", path.display()))?;
        Self::from_csv(reader)
            .with_context(|| format!("failed to load attribute table '{}'", path.display()))
    }

    pub fn from_csv<R>(mut reader: csv::Reader<R>) -> Result<Self>
    where
        R: std::io::Read,
    {
        let mut table = Self::default();
        for (line, row) in reader.deserialize::<TableRow>().enumerate() {
            let TableRow {
                first,
                second,
                attributes,
            } = row?;
            let attributes = parse_attributes(&attributes, line + 1)?;
            table.insert(first, second, attributes)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, first: i64, second: i64, attributes: Vec<usize>) -> Result<()> {
        ensure!(
            self.entries.insert((first, second), attributes).is_none(),
            "the class pair ({}, {}) is listed twice",
            first,
            second
        );
        Ok(())
    }

    /// Shared attributes of the ordered pair, empty when the pair is absent.
    pub fn lookup(&self, first: i64, second: i64) -> &[usize] {
        self.entries
            .get(&(first, second))
            .map(|attributes| attributes.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest part index listed anywhere.
    pub fn max_attribute(&self) -> Option<usize> {
        self.entries.values().flatten().copied().max()
    }
}

fn parse_attributes(text: &str, row: usize) -> Result<Vec<usize>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .with_context(|| format!("invalid part index '{}' on row {}", token, row))
        })
        .try_collect()
}
