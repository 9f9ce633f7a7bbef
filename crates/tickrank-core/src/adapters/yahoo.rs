use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Deserialize;
use time::Duration;

use crate::data_source::{
    DataSource, FinancialsRequest, HistoryRequest, SourceError, SummaryRequest,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{
    ClosePoint, FinancialStatements, PriceHistory, ProviderId, SummaryInfo, Symbol, UtcDateTime,
    ValidationError,
};

// ============================================================================
// Yahoo Auth Manager - Handles cookie/crumb authentication
// ============================================================================

/// Manages Yahoo Finance cookie/crumb authentication.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (held in the transport's cookie jar)
/// 2. Crumb token from query1.finance.yahoo.com/v1/test/getcrumb
#[derive(Clone)]
pub struct YahooAuthManager {
    crumb: Arc<std::sync::Mutex<Option<String>>>,
    last_refresh: Arc<std::sync::Mutex<Option<Instant>>>,
    refreshing: Arc<AtomicBool>,
    /// Auth TTL in seconds (default: 1 hour)
    auth_ttl_secs: u64,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Arc::new(std::sync::Mutex::new(None)),
            last_refresh: Arc::new(std::sync::Mutex::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
            auth_ttl_secs: 3600,
        }
    }
}

impl YahooAuthManager {
    fn is_auth_valid(&self) -> bool {
        let crumb = self.crumb.lock().expect("crumb lock");
        let last_refresh = self.last_refresh.lock().expect("refresh lock");

        if crumb.is_none() {
            return false;
        }

        if let Some(last) = *last_refresh {
            return last.elapsed().as_secs() < self.auth_ttl_secs;
        }

        false
    }

    /// Get the current crumb for use in query parameters, refreshing if needed.
    pub async fn get_crumb(
        &self,
        http_client: &Arc<dyn HttpClient>,
    ) -> Result<String, SourceError> {
        if self.is_auth_valid() {
            if let Some(crumb) = self.crumb.lock().expect("crumb lock").clone() {
                return Ok(crumb);
            }
        }

        self.refresh_auth(http_client).await?;

        let crumb = self.crumb.lock().expect("crumb lock").clone();
        crumb.ok_or_else(|| SourceError::unavailable("failed to obtain Yahoo crumb"))
    }

    async fn refresh_auth(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), SourceError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            // Another task is refreshing; give it a moment and re-check.
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            if self.is_auth_valid() {
                return Ok(());
            }
        }

        let result = self.do_refresh(http_client).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    async fn do_refresh(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), SourceError> {
        // Step 1: visit fc.yahoo.com so the jar picks up session cookies.
        let cookie_request = HttpRequest::get("https://fc.yahoo.com")
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(10_000);

        let _cookie_response = http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        // Step 2: fetch the crumb token.
        let crumb_endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in &crumb_endpoints {
            let crumb_request = HttpRequest::get(endpoint.to_string())
                .with_header("referer", "https://finance.yahoo.com/")
                .with_timeout_ms(10_000);

            match http_client.execute(crumb_request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();

                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }

                    if body.to_lowercase().contains("too many requests") {
                        return Err(SourceError::rate_limited(
                            "Yahoo rate limited while fetching crumb",
                        ));
                    }

                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        *self.crumb.lock().expect("crumb lock") = Some(body.to_string());
                        *self.last_refresh.lock().expect("refresh lock") = Some(Instant::now());
                        return Ok(());
                    }
                }
                _ => continue,
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }

    /// Invalidate cached auth (triggers refresh on next call).
    pub fn invalidate(&self) {
        *self.crumb.lock().expect("crumb lock") = None;
        *self.last_refresh.lock().expect("refresh lock") = None;
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo adapter supporting both real API calls and deterministic mock data.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    use_real_api: bool,
    auth_manager: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            use_real_api: false,
            auth_manager: Arc::new(YahooAuthManager::default()),
            timeout_ms: 10_000,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn is_real_client(&self) -> bool {
        self.use_real_api
    }

    /// Execute a crumb-authenticated GET, refreshing auth and retrying once
    /// on 401/429.
    async fn fetch_with_auth_retry(&self, base_endpoint: &str) -> Result<String, SourceError> {
        let crumb = self.auth_manager.get_crumb(&self.http_client).await?;
        let endpoint = append_crumb(base_endpoint, &crumb);

        let request = HttpRequest::get(endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        if response.status == 401 || response.status == 429 {
            self.auth_manager.invalidate();
            let crumb = self.auth_manager.get_crumb(&self.http_client).await?;
            let retry_request = HttpRequest::get(append_crumb(base_endpoint, &crumb))
                .with_header("referer", "https://finance.yahoo.com/")
                .with_timeout_ms(self.timeout_ms);

            let retry_response = self.http_client.execute(retry_request).await.map_err(|e| {
                SourceError::unavailable(format!("yahoo transport error on retry: {}", e.message()))
            })?;

            if !retry_response.is_success() {
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {} after auth refresh",
                    retry_response.status
                )));
            }

            return Ok(retry_response.body);
        }

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_history(&req).await
            } else {
                fetch_fake_history(&req)
            }
        })
    }

    fn financials<'a>(
        &'a self,
        req: FinancialsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinancialStatements, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_financials(&req).await
            } else {
                Ok(fetch_fake_financials(&req))
            }
        })
    }

    fn summary<'a>(
        &'a self,
        req: SummaryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SummaryInfo, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_summary(&req).await
            } else {
                Ok(fetch_fake_summary(&req))
            }
        })
    }
}

// Real API methods
impl YahooAdapter {
    async fn fetch_real_history(&self, req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
        let endpoint = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval=1d",
            urlencoding::encode(req.symbol.as_str()),
            req.lookback.as_str(),
        );

        let body = self.fetch_with_auth_retry(&endpoint).await?;

        let chart_response: YahooChartResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = &chart_response.chart.error {
            return Err(SourceError::no_data(format!(
                "yahoo chart API error: {}",
                error.describe()
            )));
        }

        let result = chart_response
            .chart
            .result
            .first()
            .ok_or_else(|| SourceError::no_data("no chart data in response"))?;

        let timestamps = result
            .timestamp
            .as_ref()
            .ok_or_else(|| SourceError::no_data("no timestamp data"))?;
        let quote = result
            .indicators
            .quote
            .first()
            .ok_or_else(|| SourceError::no_data("no quote data"))?;

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts_value) in timestamps.iter().enumerate() {
            let Some(Some(close)) = quote.close.get(i) else {
                continue;
            };

            let ts_offset = time::OffsetDateTime::from_unix_timestamp(ts_value)
                .map_err(|e| SourceError::internal(format!("invalid timestamp: {e}")))?;
            let ts = UtcDateTime::from_offset_datetime(ts_offset)
                .map_err(|e| SourceError::internal(format!("timestamp not UTC: {e}")))?;

            if let Ok(point) = ClosePoint::new(ts, *close) {
                points.push(point);
            }
        }

        if points.is_empty() {
            return Err(SourceError::no_data(format!(
                "yahoo returned no usable closes for '{}'",
                req.symbol
            )));
        }

        Ok(PriceHistory::new(req.symbol.clone(), req.lookback, points))
    }

    async fn fetch_real_financials(
        &self,
        req: &FinancialsRequest,
    ) -> Result<FinancialStatements, SourceError> {
        let endpoint = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=incomeStatementHistory,balanceSheetHistory",
            urlencoding::encode(req.symbol.as_str()),
        );

        let body = self.fetch_with_auth_retry(&endpoint).await?;
        let result = parse_quote_summary(&body)?;

        let income_reports = result
            .income_statement_history
            .as_ref()
            .map(|history| history.income_statement_history.as_slice())
            .unwrap_or_default();
        let balance_reports = result
            .balance_sheet_history
            .as_ref()
            .map(|history| history.balance_sheet_statements.as_slice())
            .unwrap_or_default();

        // Reports arrive newest-first; index 0 is the latest period.
        Ok(FinancialStatements {
            symbol: req.symbol.clone(),
            revenue_latest: income_reports.first().and_then(|r| r.total_revenue.raw()),
            revenue_prior: income_reports.get(1).and_then(|r| r.total_revenue.raw()),
            net_income_latest: income_reports.first().and_then(|r| r.net_income.raw()),
            net_income_prior: income_reports.get(1).and_then(|r| r.net_income.raw()),
            equity_latest: balance_reports
                .first()
                .and_then(|r| r.total_stockholder_equity.raw()),
        })
    }

    async fn fetch_real_summary(&self, req: &SummaryRequest) -> Result<SummaryInfo, SourceError> {
        let endpoint = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=summaryDetail,defaultKeyStatistics",
            urlencoding::encode(req.symbol.as_str()),
        );

        let body = self.fetch_with_auth_retry(&endpoint).await?;
        let result = parse_quote_summary(&body)?;

        Ok(SummaryInfo {
            symbol: req.symbol.clone(),
            trailing_pe: result
                .summary_detail
                .as_ref()
                .and_then(|detail| detail.trailing_pe.raw()),
            price_to_book: result
                .default_key_statistics
                .as_ref()
                .and_then(|stats| stats.price_to_book.raw()),
        })
    }
}

fn append_crumb(base_endpoint: &str, crumb: &str) -> String {
    format!("{base_endpoint}&crumb={}", urlencoding::encode(crumb))
}

fn parse_quote_summary(body: &str) -> Result<YahooQuoteSummaryResult, SourceError> {
    let response: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo summary: {e}")))?;

    if let Some(error) = response.quote_summary.error {
        return Err(SourceError::no_data(format!(
            "yahoo quoteSummary API error: {}",
            error.describe()
        )));
    }

    response
        .quote_summary
        .result
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::no_data("no quoteSummary data in response"))
}

// ============================================================================
// Deterministic mock data (offline tests and --mock mode)
// ============================================================================

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as u64))
}

fn fetch_fake_history(req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
    let limit = req.lookback.trading_days();
    let now = UtcDateTime::now().into_inner();
    let seed = symbol_seed(&req.symbol);

    let base = 200.0 + (seed % 1800) as f64;
    // Small per-symbol wobble so volatility differs across the universe;
    // a steady upward drift keeps the mock benchmark in a Bull posture.
    let wobble = 1.0 + (seed % 7) as f64;
    let drift = 0.15 + (seed % 5) as f64 / 40.0;

    let mut points = Vec::with_capacity(limit);
    for index in 0..limit {
        let offset = Duration::days((limit - index - 1) as i64);
        let ts = UtcDateTime::from_offset_datetime(now - offset).map_err(validation_to_error)?;
        let phase = ((seed.wrapping_add(index as u64 * 13)) % 11) as f64 / 11.0;
        let close = base + drift * index as f64 + wobble * (phase - 0.5);
        points.push(ClosePoint::new(ts, close.max(1.0)).map_err(validation_to_error)?);
    }

    Ok(PriceHistory::new(req.symbol.clone(), req.lookback, points))
}

fn fetch_fake_financials(req: &FinancialsRequest) -> FinancialStatements {
    let seed = symbol_seed(&req.symbol);
    let revenue_prior = 40_000.0 + (seed % 60_000) as f64;
    let growth = -0.05 + (seed % 30) as f64 / 100.0;
    let revenue_latest = revenue_prior * (1.0 + growth);
    let equity = 25_000.0 + (seed % 40_000) as f64;
    let margin = 0.08 + (seed % 12) as f64 / 100.0;

    FinancialStatements {
        symbol: req.symbol.clone(),
        revenue_latest: Some(revenue_latest),
        revenue_prior: Some(revenue_prior),
        net_income_latest: Some(revenue_latest * margin),
        net_income_prior: Some(revenue_prior * margin),
        equity_latest: Some(equity),
    }
}

fn fetch_fake_summary(req: &SummaryRequest) -> SummaryInfo {
    let seed = symbol_seed(&req.symbol);
    // Every fifth symbol reports no trailing P/E, mirroring sparse
    // real-world summary data.
    let trailing_pe = if seed % 5 == 0 {
        None
    } else {
        Some(12.0 + (seed % 28) as f64)
    };

    SummaryInfo {
        symbol: req.symbol.clone(),
        trailing_pe,
        price_to_book: Some(1.0 + (seed % 80) as f64 / 10.0),
    }
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(format!("mock data validation failed: {error}"))
}

// ============================================================================
// Yahoo API response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooApiError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Vec<YahooChartResult>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Vec<YahooQuoteSummaryResult>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(rename = "incomeStatementHistory")]
    income_statement_history: Option<YahooIncomeStatementHistory>,
    #[serde(rename = "balanceSheetHistory")]
    balance_sheet_history: Option<YahooBalanceSheetHistory>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    default_key_statistics: Option<YahooKeyStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooIncomeStatementHistory {
    #[serde(rename = "incomeStatementHistory", default)]
    income_statement_history: Vec<YahooIncomeStatement>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooIncomeStatement {
    #[serde(rename = "totalRevenue", default)]
    total_revenue: YahooRawValue,
    #[serde(rename = "netIncome", default)]
    net_income: YahooRawValue,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooBalanceSheetHistory {
    #[serde(rename = "balanceSheetStatements", default)]
    balance_sheet_statements: Vec<YahooBalanceSheetStatement>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooBalanceSheetStatement {
    #[serde(rename = "totalStockholderEquity", default)]
    total_stockholder_equity: YahooRawValue,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: YahooRawValue,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooKeyStatistics {
    #[serde(rename = "priceToBook", default)]
    price_to_book: YahooRawValue,
}

/// Yahoo wraps numeric fields as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Debug, Clone, Default, Deserialize)]
struct YahooRawValue {
    raw: Option<f64>,
}

impl YahooRawValue {
    fn raw(&self) -> Option<f64> {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lookback;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("symbol")
    }

    #[tokio::test]
    async fn mock_history_is_deterministic_and_ordered() {
        let adapter = YahooAdapter::default();
        let req = HistoryRequest::new(symbol("INFY.NS"), Lookback::OneYear);

        let first = adapter.daily_history(req.clone()).await.expect("history");
        let second = adapter.daily_history(req).await.expect("history");

        assert_eq!(first.points.len(), 252);
        assert_eq!(first.closes(), second.closes());
        for pair in first.points.windows(2) {
            assert!(pair[0].ts < pair[1].ts, "points must be oldest first");
        }
    }

    #[tokio::test]
    async fn mock_financials_report_both_periods() {
        let adapter = YahooAdapter::default();
        let statements = adapter
            .financials(FinancialsRequest::new(symbol("TCS.NS")))
            .await
            .expect("financials");

        assert!(statements.revenue_latest.is_some());
        assert!(statements.revenue_prior.is_some());
        assert!(statements.equity_latest.is_some());
    }

    #[test]
    fn chart_parsing_skips_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1735776000, 1735862400, 1735948800],
                    "indicators": {"quote": [{"close": [100.0, null, 104.0]}]}
                }],
                "error": null
            }
        }"#;

        let parsed: YahooChartResponse = serde_json::from_str(body).expect("chart parses");
        let quote = &parsed.chart.result[0].indicators.quote[0];
        assert_eq!(quote.close.len(), 3);
        assert_eq!(quote.close[1], None);
    }

    #[test]
    fn quote_summary_parsing_reads_raw_values() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [
                            {"totalRevenue": {"raw": 120.0}, "netIncome": {"raw": 30.0}},
                            {"totalRevenue": {"raw": 100.0}, "netIncome": {"raw": 24.0}}
                        ]
                    },
                    "balanceSheetHistory": {
                        "balanceSheetStatements": [
                            {"totalStockholderEquity": {"raw": 150.0}}
                        ]
                    }
                }],
                "error": null
            }
        }"#;

        let result = parse_quote_summary(body).expect("summary parses");
        let income = result
            .income_statement_history
            .expect("income history present");
        assert_eq!(income.income_statement_history[0].total_revenue.raw(), Some(120.0));
        assert_eq!(income.income_statement_history[1].net_income.raw(), Some(24.0));
    }

    #[test]
    fn quote_summary_error_is_surfaced() {
        let body = r#"{
            "quoteSummary": {
                "result": [],
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;

        let err = parse_quote_summary(body).expect_err("must fail");
        assert_eq!(err.kind(), crate::SourceErrorKind::NoData);
        assert!(err.message().contains("No data found"));
    }
}
