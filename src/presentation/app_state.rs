// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::presentation::grid::GridLabels;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub labels: GridLabels,
}
