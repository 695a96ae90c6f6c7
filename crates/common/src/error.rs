use std::fmt;

/// Classification of every failure a user can see
///
/// Pipeline errors map onto exactly one kind through their `kind()` method, so
/// the surface only ever has to render these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requestor keypair could not be created. Fatal for the session.
    KeyGeneration,
    /// The public key could not be exported into a link. Fatal for the session.
    KeyExport,
    /// A share link did not carry a usable public key. Fatal for the sender.
    KeyImport,
    /// A sender could not produce a payload. Recoverable by entering the secret again.
    Encryption,
    /// A payload or decrypted text was structurally malformed. Recoverable.
    Decoding,
    /// A payload did not decrypt under this session's key. Recoverable.
    Decryption,
    /// The system clipboard was unavailable. Never fatal.
    ClipboardAccess,
}

impl ErrorKind {
    /// Short title for the failure
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::KeyGeneration => "Failed to create keypair",
            ErrorKind::KeyExport => "Failed to export public key",
            ErrorKind::KeyImport => "Invalid key",
            ErrorKind::Encryption => "Failed to encrypt",
            ErrorKind::Decoding => "Failed to decode",
            ErrorKind::Decryption => "Failed to decrypt",
            ErrorKind::ClipboardAccess => "Clipboard unavailable",
        }
    }

    /// What the user should do about it
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::KeyGeneration | ErrorKind::KeyExport => {
                "The key for this session could not be created. Start a new session to try again."
            }
            ErrorKind::KeyImport => "This link isn't working, request a new one.",
            ErrorKind::Encryption => "Failed to encrypt, try entering the secret again.",
            ErrorKind::Decoding => "Failed to decode, ensure the message is copied correctly.",
            ErrorKind::Decryption => {
                "Failed to decrypt, try sending a new link and be sure not to end this session."
            }
            ErrorKind::ClipboardAccess => "Could not access the clipboard, copy the text manually.",
        }
    }

    /// Whether the current session or role cannot continue after this failure
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::KeyGeneration | ErrorKind::KeyExport | ErrorKind::KeyImport
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.user_message())
    }
}
