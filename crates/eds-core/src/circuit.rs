//! Circuit labels and the reference label map.
//!
//! Circuits (`Kring` elements) are never named in the packed file. Their
//! label is derived from their position in a depth-first walk: the first
//! circuit is `A`, the 27th is `AA`, and so on. Both conversion directions
//! derive the labels from the walk alone, so the generator here is a plain
//! counter that is created fresh for every conversion.

use indexmap::IndexMap;

/// Element type name of a circuit.
pub const CIRCUIT_TYPE: &str = "Kring";

/// Returns the label of the circuit at traversal index `index` (0-based).
///
/// The sequence follows spreadsheet column naming: `A`..`Z`, `AA`..`AZ`,
/// `BA`, ...
///
/// # Examples
///
/// ```
/// use eds_core::circuit::circuit_label;
///
/// assert_eq!(circuit_label(0), "A");
/// assert_eq!(circuit_label(25), "Z");
/// assert_eq!(circuit_label(26), "AA");
/// assert_eq!(circuit_label(52), "BA");
/// ```
pub fn circuit_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Builds the reference label `"<circuit>.<nr>"`.
pub fn reference_label(circuit: &str, nr: &str) -> String {
    format!("{circuit}.{nr}")
}

/// Hands out circuit labels in traversal order.
#[derive(Debug, Default)]
pub struct CircuitLabels {
    next: usize,
}

impl CircuitLabels {
    /// Creates a generator starting at `A`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label for the next circuit visited.
    pub fn next_label(&mut self) -> String {
        let label = circuit_label(self.next);
        self.next += 1;
        label
    }

    /// Number of labels handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Mapping between reference labels and element identifiers.
///
/// Export fills it in label → id direction, import in id → label direction;
/// both views are kept so either side can be queried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    by_label: IndexMap<String, u64>,
    by_id: IndexMap<u64, String>,
}

impl LabelMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `label` for element `id`.
    ///
    /// A label registered twice points at the most recent element.
    pub fn insert(&mut self, label: String, id: u64) {
        self.by_id.insert(id, label.clone());
        self.by_label.insert(label, id);
    }

    /// Looks up the element registered under `label`.
    pub fn id_for(&self, label: &str) -> Option<u64> {
        self.by_label.get(label).copied()
    }

    /// Looks up the label of element `id`.
    pub fn label_for(&self, id: u64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Iterates over `(label, id)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.by_label.iter().map(|(label, id)| (label.as_str(), *id))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    /// Returns `true` when no label is registered.
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_circuit_label_sequence() {
        let labels: Vec<_> = (0..28).map(circuit_label).collect();
        assert_eq!(labels[0], "A");
        assert_eq!(labels[1], "B");
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
        assert_eq!(labels[27], "AB");
        assert_eq!(circuit_label(51), "AZ");
        assert_eq!(circuit_label(52), "BA");
        assert_eq!(circuit_label(701), "ZZ");
        assert_eq!(circuit_label(702), "AAA");
    }

    #[test]
    fn test_generator_restarts_per_instance() {
        let mut first = CircuitLabels::new();
        assert_eq!(first.next_label(), "A");
        assert_eq!(first.next_label(), "B");
        assert_eq!(first.issued(), 2);

        let mut second = CircuitLabels::new();
        assert_eq!(second.next_label(), "A");
    }

    #[test]
    fn test_label_map_last_registration_wins() {
        let mut labels = LabelMap::new();
        labels.insert("A.1".to_string(), 2);
        labels.insert("A.1".to_string(), 7);

        assert_eq!(labels.id_for("A.1"), Some(7));
        assert_eq!(labels.label_for(7), Some("A.1"));
        assert_eq!(labels.len(), 1);
        assert!(labels.id_for("B.1").is_none());
    }

    #[test]
    fn test_reference_label() {
        assert_eq!(reference_label("AB", "12"), "AB.12");
    }

    /// Inverse of [`circuit_label`] used to check the sequence is a bijection.
    fn label_index(label: &str) -> usize {
        label
            .bytes()
            .fold(0, |acc, byte| acc * 26 + usize::from(byte - b'A' + 1))
            - 1
    }

    proptest! {
        #[test]
        fn prop_label_is_bijective(index in 0usize..200_000) {
            let label = circuit_label(index);
            prop_assert!(label.bytes().all(|b| b.is_ascii_uppercase()));
            prop_assert_eq!(label_index(&label), index);
        }

        #[test]
        fn prop_labels_increase_in_length_then_lexically(index in 0usize..200_000) {
            let current = circuit_label(index);
            let next = circuit_label(index + 1);
            prop_assert!(
                next.len() > current.len() || (next.len() == current.len() && next > current)
            );
        }
    }
}
