use base58::ToBase58;

/// The size of a BLAKE3 digest in bytes.
pub const BLAKE3_HASH_SIZE: usize = 32;

/// A BLAKE3 digest over some canonical byte representation.
///
/// Used to derive stable identifiers for issued credentials: two credentials
/// with identical canonical bytes always receive the same identifier.
///
/// ```rust
/// use pod_common::Fingerprint;
///
/// let fingerprint = Fingerprint::hash(b"hello world");
/// assert!(fingerprint.to_urn().starts_with("urn:blake3:"));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fingerprint([u8; BLAKE3_HASH_SIZE]);

impl Fingerprint {
    /// Computes the BLAKE3 digest of the given bytes.
    pub fn hash(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).into())
    }

    /// Computes one digest over a sequence of chunks.
    pub fn hash_iter<'a, I>(chunks: I) -> Self
    where
        I: Iterator<Item = &'a [u8]>,
    {
        let mut hasher = blake3::Hasher::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn bytes(&self) -> &[u8; BLAKE3_HASH_SIZE] {
        &self.0
    }

    /// Base58 (bitcoin alphabet) rendering of the digest.
    pub fn to_base58(&self) -> String {
        self.0.to_base58()
    }

    /// Renders the digest as a URN usable as a credential identifier.
    pub fn to_urn(&self) -> String {
        format!("urn:blake3:{}", self.to_base58())
    }
}

impl From<[u8; BLAKE3_HASH_SIZE]> for Fingerprint {
    fn from(value: [u8; BLAKE3_HASH_SIZE]) -> Self {
        Fingerprint(value)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}
