use serde::Serialize;

/// Static icon catalog. Stores treat icon codes as opaque validated strings;
/// only the templates render the SVG markup.
#[derive(Debug, Clone, Serialize)]
pub struct Icon {
    pub code: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub svg: &'static str,
}

macro_rules! icon {
    ($code:expr, $name:expr, $cat:expr, $path:expr) => {
        Icon {
            code: $code,
            name: $name,
            category: $cat,
            svg: concat!(
                "<svg viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" \
                 stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\">",
                $path,
                "</svg>"
            ),
        }
    };
}

pub const ICONS: &[Icon] = &[
    icon!("check", "Checkmark", "general", "<polyline points=\"20 6 9 17 4 12\"/>"),
    icon!("star", "Star", "general", "<polygon points=\"12 2 15 9 22 9 17 14 18 21 12 17 6 21 7 14 2 9 9 9\"/>"),
    icon!("clock", "Clock", "general", "<circle cx=\"12\" cy=\"12\" r=\"10\"/><polyline points=\"12 6 12 12 16 14\"/>"),
    icon!("phone", "Phone", "general", "<path d=\"M22 16.9v3a2 2 0 0 1-2.2 2 19.8 19.8 0 0 1-8.6-3 19.5 19.5 0 0 1-6-6 19.8 19.8 0 0 1-3-8.7A2 2 0 0 1 4.1 2h3a2 2 0 0 1 2 1.7l.6 3.2a2 2 0 0 1-.5 1.8L8 9.9a16 16 0 0 0 6 6l1.2-1.2a2 2 0 0 1 1.8-.5l3.2.6a2 2 0 0 1 1.8 2.1z\"/>"),
    icon!("map-pin", "Map pin", "general", "<path d=\"M21 10c0 7-9 13-9 13s-9-6-9-13a9 9 0 0 1 18 0z\"/><circle cx=\"12\" cy=\"10\" r=\"3\"/>"),
    icon!("wifi", "Wi-Fi", "amenities", "<path d=\"M5 12.5a11 11 0 0 1 14 0\"/><path d=\"M8.5 15.5a6 6 0 0 1 7 0\"/><line x1=\"12\" y1=\"19\" x2=\"12\" y2=\"19\"/>"),
    icon!("bed", "Bed", "amenities", "<path d=\"M2 9v9\"/><path d=\"M2 13h20v5\"/><path d=\"M6 9a2 2 0 0 1 4 0\"/><path d=\"M12 13V9a2 2 0 0 1 2-2h6a2 2 0 0 1 2 2v4\"/>"),
    icon!("pool", "Swimming pool", "amenities", "<path d=\"M2 18c1.5 1 3 1 4.5 0s3-1 4.5 0 3 1 4.5 0 3-1 4.5 0\"/><path d=\"M8 14V5a2 2 0 0 1 4 0\"/><path d=\"M14 14V5a2 2 0 0 1 4 0\"/>"),
    icon!("spa", "Spa", "amenities", "<path d=\"M12 22c5 0 9-4 9-9-5 0-9 4-9 9z\"/><path d=\"M12 22c-5 0-9-4-9-9 5 0 9 4 9 9z\"/><path d=\"M12 13V2l3 3\"/>"),
    icon!("gym", "Fitness room", "amenities", "<path d=\"M6.5 6.5L17.5 17.5\"/><path d=\"M4 9l-2 2 2 2\"/><path d=\"M20 9l2 2-2 2\"/><rect x=\"3\" y=\"7\" width=\"4\" height=\"10\" rx=\"1\"/><rect x=\"17\" y=\"7\" width=\"4\" height=\"10\" rx=\"1\"/>"),
    icon!("parking", "Parking", "amenities", "<rect x=\"3\" y=\"3\" width=\"18\" height=\"18\" rx=\"2\"/><path d=\"M9 17V7h4a3 3 0 0 1 0 6H9\"/>"),
    icon!("shuttle", "Airport shuttle", "amenities", "<rect x=\"2\" y=\"6\" width=\"17\" height=\"11\" rx=\"2\"/><circle cx=\"7\" cy=\"19\" r=\"2\"/><circle cx=\"15\" cy=\"19\" r=\"2\"/><path d=\"M19 10h3v5h-3\"/>"),
    icon!("restaurant", "Restaurant", "dining", "<path d=\"M3 2v7a2 2 0 0 0 4 0V2\"/><path d=\"M5 11v11\"/><path d=\"M19 2c-2 2-3 5-3 8h3v12\"/>"),
    icon!("coffee", "Coffee", "dining", "<path d=\"M17 8h1a4 4 0 0 1 0 8h-1\"/><path d=\"M3 8h14v9a4 4 0 0 1-4 4H7a4 4 0 0 1-4-4z\"/>"),
    icon!("breakfast", "Breakfast", "dining", "<circle cx=\"12\" cy=\"12\" r=\"8\"/><circle cx=\"12\" cy=\"12\" r=\"4\"/>"),
    icon!("room-service", "Room service", "dining", "<path d=\"M3 17h18\"/><path d=\"M4 17a8 8 0 0 1 16 0\"/><line x1=\"12\" y1=\"6\" x2=\"12\" y2=\"9\"/>"),
    icon!("laundry", "Laundry", "services", "<rect x=\"4\" y=\"2\" width=\"16\" height=\"20\" rx=\"2\"/><circle cx=\"12\" cy=\"13\" r=\"5\"/><line x1=\"7\" y1=\"5\" x2=\"9\" y2=\"5\"/>"),
    icon!("concierge", "Concierge bell", "services", "<path d=\"M4 18h16\"/><path d=\"M5 18a7 7 0 0 1 14 0\"/><line x1=\"12\" y1=\"8\" x2=\"12\" y2=\"11\"/><line x1=\"10\" y1=\"8\" x2=\"14\" y2=\"8\"/>"),
    icon!("key", "Room key", "services", "<circle cx=\"7.5\" cy=\"15.5\" r=\"5.5\"/><path d=\"M21 2l-9.6 9.6\"/><path d=\"M15.5 7.5l3 3L22 7l-3-3\"/>"),
    icon!("luggage", "Luggage storage", "services", "<rect x=\"6\" y=\"7\" width=\"12\" height=\"14\" rx=\"2\"/><path d=\"M9 7V4a2 2 0 0 1 2-2h2a2 2 0 0 1 2 2v3\"/>"),
];

pub fn find_icon(code: &str) -> Option<&'static Icon> {
    ICONS.iter().find(|i| i.code == code)
}

/// Distinct categories, in catalog order (for the icon picker UI).
pub fn icon_categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for icon in ICONS {
        if !out.contains(&icon.category) {
            out.push(icon.category);
        }
    }
    out
}
