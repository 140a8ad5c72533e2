use rand::Rng;

/// Non-empty set of candidate addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressPool {
    addresses: Vec<String>,
}

impl AddressPool {
    /// Returns `None` for an empty list.
    pub fn new(addresses: Vec<String>) -> Option<Self> {
        if addresses.is_empty() {
            return None;
        }
        Some(Self { addresses })
    }

    /// Uniform pick over the whole pool.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.addresses[rng.gen_range(0..self.addresses.len())]
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
