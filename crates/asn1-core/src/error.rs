//! Error kinds for the decoder, and the annotation stack that records where,
//! in a nested template, a failure originated.

/// Primary failure reasons a decode step can report.
///
/// Grouped by where they're detected: format errors from the tag/length
/// reader or the aggregate walkers, content errors found while interpreting
/// a successfully-parsed header, template errors that indicate a bug in the
/// static descriptor tree rather than bad input, and resource errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asn1ErrorKind {
    // --- format ---
    /// The identifier/length octet group could not be parsed at all.
    BadObjectHeader,
    /// A length or tag number exceeded the representable range.
    TooLong,
    /// The observed tag did not match what the template required, and the
    /// field was not optional.
    WrongTag,
    /// A SEQUENCE/SET header was not marked constructed.
    SequenceNotConstructed,
    /// A definite-length SEQUENCE/SET had leftover or missing content bytes.
    SequenceLengthMismatch,
    /// An end-of-contents marker appeared somewhere it could not.
    UnexpectedEoc,
    /// An indefinite-length region never reached an end-of-contents marker.
    MissingEoc,
    /// An EXPLICIT tag wrapper's header was not constructed.
    ExplicitTagNotConstructed,
    /// `BMPSTRING` content length was not even.
    BmpStringWrongLength,
    /// `UNIVERSALSTRING` content length was not a multiple of four.
    UniversalStringWrongLength,
    /// `NULL` content was not zero-length.
    NullWrongLength,
    /// `BOOLEAN` content was not exactly one byte.
    BooleanWrongLength,

    // --- content ---
    /// Constructed-string fragment collection exceeded its recursion bound.
    NestedAsn1String,
    /// Constructed nesting exceeded [`crate::MAX_CONSTRUCTED_NEST`].
    NestedTooDeep,
    /// A required SEQUENCE/CHOICE field never appeared.
    FieldMissing,
    /// No CHOICE arm's tag matched the input.
    NoMatchingChoiceType,
    /// An MSTRING field's observed tag was not UNIVERSAL class.
    MstringNotUniversal,
    /// An MSTRING field's observed tag was not in its permitted set.
    MstringWrongTag,

    // --- template ---
    /// A static descriptor violates a structural invariant.
    BadTemplate,
    /// An ANY field was given a tag override.
    IllegalTaggedAny,
    /// An ANY field was marked OPTIONAL.
    IllegalOptionalAny,
    /// A lone item-template descriptor carried tagging/OPTIONAL flags.
    IllegalOptionsOnItemTemplate,

    // --- resource / aggregate ---
    /// Allocation failure. Kept in the taxonomy for completeness, though
    /// ordinary Rust allocation failure aborts the process rather than
    /// returning this variant.
    MallocFailure,
    /// Wraps an inner error while unwinding through nested templates.
    NestedAsn1Error,
    /// Carries an auxiliary (non-decoder) error, e.g. from an `Extern` hook.
    AuxError,
}

impl core::fmt::Display for Asn1ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::BadObjectHeader => "bad object header",
            Self::TooLong => "length or tag number too long",
            Self::WrongTag => "wrong tag",
            Self::SequenceNotConstructed => "sequence not constructed",
            Self::SequenceLengthMismatch => "sequence length mismatch",
            Self::UnexpectedEoc => "unexpected end-of-contents",
            Self::MissingEoc => "missing end-of-contents",
            Self::ExplicitTagNotConstructed => "explicit tag not constructed",
            Self::BmpStringWrongLength => "BMPString is wrong length",
            Self::UniversalStringWrongLength => "UniversalString is wrong length",
            Self::NullWrongLength => "NULL is wrong length",
            Self::BooleanWrongLength => "BOOLEAN is wrong length",
            Self::NestedAsn1String => "nested ASN.1 string exceeds depth bound",
            Self::NestedTooDeep => "nested too deep",
            Self::FieldMissing => "field missing",
            Self::NoMatchingChoiceType => "no matching choice type",
            Self::MstringNotUniversal => "multi-string tag not universal class",
            Self::MstringWrongTag => "multi-string tag not permitted",
            Self::BadTemplate => "bad template",
            Self::IllegalTaggedAny => "ANY field may not be tagged",
            Self::IllegalOptionalAny => "ANY field may not be optional",
            Self::IllegalOptionsOnItemTemplate => "illegal options on item template",
            Self::MallocFailure => "allocation failure",
            Self::NestedAsn1Error => "nested ASN.1 error",
            Self::AuxError => "auxiliary error",
        };
        f.write_str(text)
    }
}

/// One frame of context appended as an error unwinds through nested
/// templates: which named field, and which type name, was being decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1Annotation {
    pub field: Option<&'static str>,
    pub type_name: &'static str,
}

impl core::fmt::Display for Asn1Annotation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.field {
            Some(field) => write!(f, "Field={field}, Type={}", self.type_name),
            None => write!(f, "Type={}", self.type_name),
        }
    }
}

/// A decode failure: the primary kind detected at the innermost frame, plus
/// the stack of annotations appended by every enclosing frame on the way
/// back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1Error {
    pub kind: Asn1ErrorKind,
    pub annotations: Vec<Asn1Annotation>,
}

impl Asn1Error {
    pub fn new(kind: Asn1ErrorKind) -> Self {
        Self {
            kind,
            annotations: Vec::new(),
        }
    }

    /// Append an annotation frame and return `self`, for chaining at each
    /// enclosing call site as the error propagates outward.
    #[must_use]
    pub fn annotate(mut self, field: Option<&'static str>, type_name: &'static str) -> Self {
        self.annotations.push(Asn1Annotation { field, type_name });
        self
    }
}

impl core::fmt::Display for Asn1Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)?;
        for annotation in &self.annotations {
            write!(f, " <- {annotation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Asn1Error {}

/// Result type for decoder operations.
pub type Asn1Result<T> = Result<T, Asn1Error>;
