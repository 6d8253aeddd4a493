// Ground colour ramp for untextured tiles: four 64-entry bands
// (light grey-green, grass, dirt, dark soil)

/// RGB in `0.0..=1.0` for a tile colour index
pub fn ground_color(index: u8) -> [f32; 3] {
    let i = f32::from(index % 64);
    let rgb = match index / 64 {
        0 => [255.0 - i * 4.0, 255.0 - i * 1.75, 255.0 - i * 4.0],
        1 => [i * 3.0, 144.0, 0.0],
        2 => [192.0 - i * 1.5, 144.0 - i * 1.5, 0.0],
        _ => [96.0 - i * 1.5, 48.0 + i * 1.5, 0.0],
    };
    rgb.map(|c| c / 255.0)
}
