use google_drive3::DriveHub;
use google_sheets4::api::{
    AddSheetRequest, BatchUpdateSpreadsheetRequest, ClearValuesRequest, GridProperties, Request,
    SheetProperties, ValueRange,
};
use google_sheets4::Sheets;
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use ledger_core::{Cell, LedgerError, Result};
use ledger_report::{SheetSink, to_json_rows};
use std::collections::HashSet;
use std::path::Path;

// Each hub authenticates through the oauth2 re-export of its own crate to avoid version mismatches.
use google_drive3::oauth2 as drive_oauth2;
use google_sheets4::oauth2 as sheets_oauth2;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Geometry of a freshly created tab.
const NEW_TAB_ROWS: i32 = 1000;
const NEW_TAB_COLUMNS: i32 = 20;

type Connector = HttpsConnector<HttpConnector>;

fn https_connector() -> Connector {
    hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build()
}

fn auth_error(context: &str, e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Authentication(format!("{context}: {e}"))
}

/// `'Tab name'` as an A1 sheet reference.
fn quoted(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Spreadsheet document opened by name through a service account.
pub struct GoogleSheetsSink {
    hub: Sheets<Connector>,
    spreadsheet_id: String,
    tabs: HashSet<String>,
}

impl GoogleSheetsSink {
    /// Authenticate and open `document`. The document must be shared with
    /// the service account.
    pub async fn connect(credentials: &Path, document: &str) -> Result<Self> {
        let client = hyper::Client::builder().build(https_connector());

        let drive_key = drive_oauth2::read_service_account_key(credentials)
            .await
            .map_err(|e| auth_error(&format!("read {}", credentials.display()), e))?;
        let drive_auth = drive_oauth2::ServiceAccountAuthenticator::builder(drive_key)
            .build()
            .await
            .map_err(|e| auth_error("building drive authenticator", e))?;
        let drive = DriveHub::new(client.clone(), drive_auth);

        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            document.replace('\'', "\\'")
        );
        let (_, list) = drive
            .files()
            .list()
            .q(&query)
            .page_size(1)
            .doit()
            .await
            .map_err(|e| auth_error("searching spreadsheets", e))?;
        let spreadsheet_id = list
            .files
            .unwrap_or_default()
            .into_iter()
            .find_map(|f| f.id)
            .ok_or_else(|| {
                LedgerError::Authentication(format!(
                    "spreadsheet '{document}' not found or not shared with the service account"
                ))
            })?;

        let sheets_key = sheets_oauth2::read_service_account_key(credentials)
            .await
            .map_err(|e| auth_error(&format!("read {}", credentials.display()), e))?;
        let sheets_auth = sheets_oauth2::ServiceAccountAuthenticator::builder(sheets_key)
            .build()
            .await
            .map_err(|e| auth_error("building sheets authenticator", e))?;
        let hub = Sheets::new(client, sheets_auth);

        let (_, spreadsheet) = hub
            .spreadsheets()
            .get(&spreadsheet_id)
            .doit()
            .await
            .map_err(|e| auth_error("opening spreadsheet", e))?;
        let tabs = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.properties.and_then(|p| p.title))
            .collect();

        log::info!("Opened spreadsheet '{document}' ({spreadsheet_id})");
        Ok(Self {
            hub,
            spreadsheet_id,
            tabs,
        })
    }
}

impl SheetSink for GoogleSheetsSink {
    async fn upsert_tab(&mut self, title: &str) -> Result<()> {
        if self.tabs.contains(title) {
            return Ok(());
        }

        let add = AddSheetRequest {
            properties: Some(SheetProperties {
                title: Some(title.to_string()),
                grid_properties: Some(GridProperties {
                    row_count: Some(NEW_TAB_ROWS),
                    column_count: Some(NEW_TAB_COLUMNS),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        let req = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                add_sheet: Some(add),
                ..Default::default()
            }]),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(req, &self.spreadsheet_id)
            .doit()
            .await
            .map_err(|e| LedgerError::sink_write(title, e))?;
        self.tabs.insert(title.to_string());
        log::debug!("created tab '{title}'");
        Ok(())
    }

    async fn overwrite_tab(&mut self, title: &str, rows: &[Vec<Cell>]) -> Result<()> {
        let sheet = quoted(title);
        self.hub
            .spreadsheets()
            .values_clear(ClearValuesRequest::default(), &self.spreadsheet_id, &sheet)
            .doit()
            .await
            .map_err(|e| LedgerError::sink_write(title, e))?;

        let range = format!("{sheet}!A1");
        let values = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.clone()),
            values: Some(to_json_rows(rows)),
        };
        self.hub
            .spreadsheets()
            .values_update(values, &self.spreadsheet_id, &range)
            .value_input_option("RAW")
            .doit()
            .await
            .map_err(|e| LedgerError::sink_write(title, e))?;
        Ok(())
    }
}
