use std::fmt;

pub mod openssl;

/// Represents the type of key to be created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyType {
    /// RSA key with a size of 4096 bits.
    Rsa4096,
}

impl KeyType {
    pub fn bits(&self) -> u32 {
        match self {
            KeyType::Rsa4096 => 4096,
        }
    }
}

/// Cipher protecting the private key at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCipher {
    Aes256,
}

impl KeyCipher {
    /// The cipher flag understood by `openssl genrsa`.
    pub fn flag(&self) -> &'static str {
        match self {
            KeyCipher::Aes256 => "-aes256",
        }
    }
}

/// Passphrase encrypting the private key. An empty value is still a passphrase.
#[derive(Clone, PartialEq, Default)]
pub struct Passphrase(String);

impl<S: AsRef<str>> From<S> for Passphrase {
    fn from(passphrase: S) -> Self {
        Passphrase(passphrase.as_ref().to_string())
    }
}

impl Passphrase {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_line_break(&self) -> bool {
        self.0.contains(['\n', '\r'])
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passphrase: redacted")
    }
}
