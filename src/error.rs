use thiserror::Error;

/// Hard failures inside the field extractor. Each one means a line the
/// record cannot exist without was never found; everything else degrades to
/// an empty field instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no CIP section header in text")]
    MissingHeader,
    #[error("no title separator after CIP header")]
    MissingTitleSeparator,
    #[error("no ISBN line in CIP section")]
    MissingIsbn,
    #[error("no registry number line in CIP section")]
    MissingRegistryLine,
    #[error("no author line in CIP section")]
    MissingAuthorLine,
}

/// Failures opening or reading an ebook container.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid pdf file: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("pdf is encrypted")]
    EncryptedPdf,
    #[error("invalid epub file: {0}")]
    Epub(String),
    #[error("invalid mobi file: {0}")]
    Mobi(String),
    #[error("page {0} out of range")]
    PageOutOfRange(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything that can go wrong for a single file, so the batch driver can
/// tally read failures and parse failures separately.
#[derive(Debug, Error)]
pub enum CipError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Format(#[from] FormatError),
}
