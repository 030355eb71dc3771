//! Serde helpers that store long runs of repeated grid values compactly.

/// Converts a list of values into a vector of `(value, run_length)` pairs when serializing and
/// expands it back when deserializing.
pub mod run_length_encoded {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn encode<I, T>(source: I) -> Vec<(T, u32)>
    where
        I: IntoIterator<Item = T>,
        T: PartialEq,
    {
        let mut runs: Vec<(T, u32)> = Vec::new();

        for it in source {
            match runs.last_mut() {
                Some(last) if last.0 == it && last.1 < u32::MAX => last.1 += 1,
                _ => runs.push((it, 1)),
            }
        }

        runs
    }

    pub fn serialize<S, T>(values: &[T], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Copy + PartialEq + Serialize,
    {
        encode(values.iter().copied()).serialize(s)
    }

    pub fn deserialize<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Copy + Deserialize<'de>,
    {
        Ok(Vec::<(T, u32)>::deserialize(d)?
            .into_iter()
            .flat_map(|(it, n)| std::iter::repeat(it).take(n as usize))
            .collect())
    }
}

/// Stores a [bitvec::vec::BitVec] as run-length encoded booleans.
pub mod bit_vec {
    use bitvec::prelude::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bits: &BitVec, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::run_length_encoded::encode(bits.iter().by_vals()).serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<BitVec, D::Error>
    where
        D: Deserializer<'de>,
    {
        let runs = Vec::<(bool, u32)>::deserialize(d)?;
        let mut bits = BitVec::with_capacity(runs.iter().map(|(_, n)| *n as usize).sum());

        for (value, n) in runs {
            for _ in 0..n {
                bits.push(value);
            }
        }

        Ok(bits)
    }
}
