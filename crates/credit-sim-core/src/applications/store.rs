//! Spreadsheet-style persistence for submitted applications.
//!
//! One header row, one row per application, columns fixed by
//! [`SHEET_HEADERS`]. The CSV store is the only code that touches the file.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{Reader, ReaderBuilder, WriterBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::applications::intake::CreditApplication;
use crate::error::CreditSimError;
use crate::types::Money;
use crate::CreditSimResult;

pub const SHEET_HEADERS: [&str; 21] = [
    "ID_Solicitud",
    "Fecha_Solicitud",
    "Nombre",
    "Apellido",
    "Cedula",
    "Telefono",
    "Email",
    "Fecha_Nacimiento",
    "Ciudad",
    "Direccion",
    "Ingresos_Mensuales",
    "Gastos_Mensuales",
    "Empresa",
    "Antiguedad_Laboral_Meses",
    "Monto_Solicitado",
    "Plazo_Meses",
    "Cuota_Estimada",
    "Acepta_Tratamiento_Datos",
    "Acepta_Terminos",
    "Acepta_Consulta_Centrales",
    "Estado",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "NUEVO")]
    New,
    #[serde(rename = "EN_REVISION")]
    InReview,
    #[serde(rename = "APROBADO")]
    Approved,
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

/// One stored application, laid out as a sheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "ID_Solicitud")]
    pub application_id: String,
    #[serde(rename = "Fecha_Solicitud", with = "sheet_timestamp")]
    pub submitted_at: NaiveDateTime,
    #[serde(rename = "Nombre")]
    pub first_name: String,
    #[serde(rename = "Apellido")]
    pub last_name: String,
    #[serde(rename = "Cedula")]
    pub national_id: String,
    #[serde(rename = "Telefono")]
    pub phone: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Fecha_Nacimiento")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "Ciudad")]
    pub city: String,
    #[serde(rename = "Direccion")]
    pub address: String,
    #[serde(rename = "Ingresos_Mensuales", with = "rust_decimal::serde::str")]
    pub monthly_income: Money,
    #[serde(rename = "Gastos_Mensuales", with = "rust_decimal::serde::str")]
    pub monthly_expenses: Money,
    #[serde(rename = "Empresa")]
    pub employer: String,
    #[serde(rename = "Antiguedad_Laboral_Meses")]
    pub employment_months: u32,
    #[serde(rename = "Monto_Solicitado", with = "rust_decimal::serde::str")]
    pub requested_amount: Money,
    #[serde(rename = "Plazo_Meses")]
    pub term_months: u32,
    #[serde(rename = "Cuota_Estimada", with = "rust_decimal::serde::str")]
    pub estimated_payment: Money,
    #[serde(rename = "Acepta_Tratamiento_Datos", with = "sheet_bool")]
    pub accepts_data_processing: bool,
    #[serde(rename = "Acepta_Terminos", with = "sheet_bool")]
    pub accepts_terms: bool,
    #[serde(rename = "Acepta_Consulta_Centrales", with = "sheet_bool")]
    pub accepts_credit_bureau_check: bool,
    #[serde(rename = "Estado")]
    pub status: ApplicationStatus,
}

impl ApplicationRecord {
    /// Flatten a validated application into a sheet row with status `NUEVO`.
    pub fn from_application(
        application_id: &str,
        submitted_at: NaiveDateTime,
        application: &CreditApplication,
        estimated_payment: Money,
    ) -> Self {
        let personal = &application.personal;
        let financial = &application.financial;
        Self {
            application_id: application_id.to_string(),
            submitted_at,
            first_name: personal.first_name.clone(),
            last_name: personal.last_name.clone(),
            national_id: personal.national_id.clone(),
            phone: personal.phone.clone(),
            email: personal.email.clone(),
            birth_date: personal.birth_date,
            city: personal.city.clone().unwrap_or_default(),
            address: personal.address.clone().unwrap_or_default(),
            monthly_income: financial.monthly_income,
            monthly_expenses: financial.monthly_expenses,
            employer: financial.employer.clone().unwrap_or_default(),
            employment_months: financial.employment_months.unwrap_or(0),
            requested_amount: application.credit.requested_amount,
            term_months: application.credit.term_months,
            estimated_payment,
            accepts_data_processing: application.accepts_data_processing,
            accepts_terms: application.accepts_terms,
            accepts_credit_bureau_check: application.accepts_credit_bureau_check,
            status: ApplicationStatus::New,
        }
    }

    /// Cells of this record in [`SHEET_HEADERS`] order, formatted exactly as
    /// they are stored.
    pub fn sheet_row(&self) -> CreditSimResult<Vec<String>> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        wtr.serialize(self)?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| CreditSimError::StorageError(e.to_string()))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice());
        match rdr.records().next() {
            Some(row) => Ok(row?.iter().map(str::to_string).collect()),
            None => Err(CreditSimError::StorageError(format!(
                "application {} produced an empty row",
                self.application_id
            ))),
        }
    }
}

/// Append-only application store.
pub trait ApplicationStore {
    fn append(&mut self, record: &ApplicationRecord) -> CreditSimResult<()>;

    fn list(&self) -> CreditSimResult<Vec<ApplicationRecord>>;

    /// Look up one application; ids compare case-insensitively.
    fn find(&self, application_id: &str) -> CreditSimResult<ApplicationRecord> {
        let wanted = application_id.trim();
        self.list()?
            .into_iter()
            .find(|r| r.application_id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CreditSimError::NotFound(format!("application {wanted}")))
    }
}

// ---------------------------------------------------------------------------
// CSV store
// ---------------------------------------------------------------------------

/// Applications kept in a single CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvApplicationStore {
    path: PathBuf,
}

impl CsvApplicationStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_empty(&self) -> CreditSimResult<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a reader positioned after a header row that matches
    /// [`SHEET_HEADERS`].
    fn sheet_reader(&self) -> CreditSimResult<Reader<File>> {
        let mut rdr = ReaderBuilder::new().from_path(&self.path)?;
        if rdr.headers()?.iter().ne(SHEET_HEADERS.iter().copied()) {
            return Err(CreditSimError::StorageError(format!(
                "unexpected header row in {}",
                self.path.display()
            )));
        }
        Ok(rdr)
    }
}

impl ApplicationStore for CsvApplicationStore {
    fn append(&mut self, record: &ApplicationRecord) -> CreditSimResult<()> {
        let new_sheet = self.is_empty()?;
        if new_sheet {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            info!("creating application sheet at {}", self.path.display());
        } else {
            self.sheet_reader()?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = WriterBuilder::new()
            .has_headers(new_sheet)
            .from_writer(file);
        wtr.serialize(record)?;
        wtr.flush()?;

        info!(
            "application {} saved to {}",
            record.application_id,
            self.path.display()
        );
        Ok(())
    }

    fn list(&self) -> CreditSimResult<Vec<ApplicationRecord>> {
        if self.is_empty()? {
            return Ok(Vec::new());
        }

        let records = self
            .sheet_reader()?
            .deserialize::<ApplicationRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!("read {} applications from {}", records.len(), self.path.display());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryApplicationStore {
    records: Vec<ApplicationRecord>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApplicationStore for MemoryApplicationStore {
    fn append(&mut self, record: &ApplicationRecord) -> CreditSimResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn list(&self) -> CreditSimResult<Vec<ApplicationRecord>> {
        Ok(self.records.clone())
    }
}

// ---------------------------------------------------------------------------
// Cell formats
// ---------------------------------------------------------------------------

mod sheet_bool {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "TRUE" } else { "FALSE" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_uppercase().as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            other => Err(de::Error::custom(format!("expected TRUE or FALSE, got {other:?}"))),
        }
    }
}

mod sheet_timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(de::Error::custom)
    }
}
