//! Shared fixtures for static feed tests

pub mod parser_tests;

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A small but representative stops table: bus stops with embedded
/// directions, Red Line platforms whose parent has a feed record, Brown Line
/// platforms whose parent does not, and one malformed row
pub const STOPS_TABLE: &str = "\
stop_id,stop_name,stop_desc,stop_lat,stop_lon,location_type,parent_station,wheelchair_boarding
1525,Clark & Addison,\"Clark & Addison, Northbound, Northeast Corner\",41.947,-87.656,0,,1
1526,Clark & Addison,\"Clark & Addison, Southbound, Southwest Corner\",41.946,-87.657,0,,1
18033,Michigan & Lake,\"Michigan & Lake, Westbound\",41.886,-87.624,0,,0
30277,Addison (Red Line),Service toward 95th,41.947412,-87.653626,0,41420,1
30278,Addison (Red Line),Service toward Howard,41.947412,-87.653626,0,41420,1
41420,Addison,,41.947412,-87.653626,1,,1
30170,Southport (Brown Line),Service toward Kimball,41.943744,-87.663619,0,40360,1
30171,Southport (Brown Line),Service toward Loop,41.943744,-87.663619,0,40360,1
9999,Bad Stop,,999.0,-87.6,0,,0
";

/// Train station inventory matching the platforms in [`STOPS_TABLE`]
pub const TRAIN_STATIONS_TABLE: &str = "\
stop_id,map_id,stop_name,station_name,station_descriptive_name,direction_id,ada,red,blue,green,brown,purple,purple_exp,yellow,pink,orange,lat,lon
30277,41420,Addison (Southbound),Addison,Addison (Red Line),S,true,true,false,false,false,false,false,false,false,false,41.947412,-87.653626
30278,41420,Addison (Northbound),Addison,Addison (Red Line),N,true,true,false,false,false,false,false,false,false,false,41.947412,-87.653626
30170,40360,Southport (Kimball-bound),Southport,Southport (Brown Line),N,true,false,false,false,true,false,false,false,false,false,41.943744,-87.663619
30171,40360,Southport (Loop-bound),Southport,Southport (Brown Line),S,true,false,false,false,true,false,false,false,false,false,41.943744,-87.663619
";

pub const ROUTES_TABLE: &str = "\
route_id,route_short_name,route_long_name,route_type,route_color
22,22,Clark,3,565a5c
X49,X49,Western Express,3,
Red,Red,Red Line,1,c60c30
";

pub const TRIPS_TABLE: &str = "\
route_id,service_id,trip_id,direction_id,direction
22,1,t-100,0,North
22,2,t-101,1,South
Red,1,t-200,0,North
";

pub const CALENDAR_TABLE: &str = "\
service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date
1,1,1,1,1,1,0,0,20260101,20261231
2,0,0,0,0,0,1,1,20260101,20261231
";

pub const TRANSFERS_TABLE: &str = "\
route_id,stop_id
22,1525
22,1526
X49,18033
";

pub const PUBLISH_MARKER: &str = "8/26/2026 10:15:32 AM";

/// Write the full synthetic cache into a fresh temporary directory
pub fn synthetic_cache() -> TempDir {
    let dir = TempDir::new().expect("create temp cache dir");
    write_full_cache(dir.path());
    dir
}

/// Write every cached table into `dir`
pub fn write_full_cache(dir: &Path) {
    fs::write(dir.join("stops.txt"), STOPS_TABLE).expect("write stops");
    fs::write(dir.join("train_stations.csv"), TRAIN_STATIONS_TABLE).expect("write stations");
    fs::write(dir.join("routes.txt"), ROUTES_TABLE).expect("write routes");
    fs::write(dir.join("trips.txt"), TRIPS_TABLE).expect("write trips");
    fs::write(dir.join("calendar.txt"), CALENDAR_TABLE).expect("write calendar");
    fs::write(dir.join("stop_transfers.csv"), TRANSFERS_TABLE).expect("write transfers");
    fs::write(dir.join("updated.txt"), PUBLISH_MARKER).expect("write marker");
}
