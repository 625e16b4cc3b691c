// Platform capture steps. Each one reports back through the `Verdi` handlers
// (`on_document_scanned`, `on_nfc_read`, `on_selfie_captured`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Passport,
    IdCard,
}

/// Chip access keys derived from the printed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcReadRequest {
    pub serial_number: String,
    /// `yyMMdd`
    pub birth_date: String,
    /// `yyMMdd`
    pub date_of_expiry: String,
}

pub trait DocumentScanner: Send + Sync {
    fn start_scan(&self, mode: ScanMode);
}

pub trait NfcReader: Send + Sync {
    fn start_read(&self, request: NfcReadRequest);
}

pub trait SelfieCapture: Send + Sync {
    fn start_capture(&self);
}
