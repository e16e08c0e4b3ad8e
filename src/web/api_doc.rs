use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::error::ErrorResponse;
use super::api::mount::{Axis, MountStatus, OffsetRequest};
use super::api::paths::ClearedPaths;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::catalog::list_catalog,
        super::api::catalog::ranking,
        super::api::paths::list_paths,
        super::api::paths::get_path,
        super::api::paths::plot_path,
        super::api::paths::clear_paths,
        super::api::observer::get_observer,
        super::api::observer::set_observer,
        super::api::mount::list_devices,
        super::api::mount::open,
        super::api::mount::close,
        super::api::mount::offset,
        super::api::mount::reset,
        super::api::tracker::start,
        super::api::tracker::stop,
        super::api::tracker::status,
        super::api::pointing::preview,
    ),
    components(
        schemas(
            ErrorResponse,
            ClearedPaths,
            MountStatus,
            OffsetRequest,
            Axis,
            crate::catalog::CatalogRecord,
            crate::catalog::TrackTarget,
            crate::predict::Observer,
            crate::track::PathPoint,
            crate::track::GroundTrack,
            crate::track::TrackedPath,
            crate::track::RankingEntry,
            crate::mount::MountCommand,
            crate::mount::DeviceInfo,
            crate::mount::DeviceKind,
            crate::tracker::TrackerMode,
            crate::tracker::TrackerStatus,
            crate::tracker::PointingSample,
            crate::tracker::PointingPreview,
            crate::tracker::TrackerEvent,
            crate::tracker::StopReason,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sat-Mount Control API",
        description = "Ground tracks, target ranking and antenna mount control",
        version = "0.1.0"
    ),
    tags(
        (name = "catalog", description = "Satellite catalog and ranking"),
        (name = "paths", description = "Plotted ground tracks"),
        (name = "observer", description = "Ground station location"),
        (name = "mount", description = "Serial mount device and manual commands"),
        (name = "tracker", description = "Pointing stream sessions and look-angle previews")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
