//! Decorative right-hand panels, one per [`Theme`].
//!
//! Every fragment is drawn in panel-local coordinates (`0..PANEL_WIDTH` by
//! `0..PANEL_HEIGHT`) and positioned by the composer. Apart from the neural
//! graph, whose node and edge positions are computed, the panels are fixed
//! compositions.

use crate::markup::{
    coord, escape_xml, BLUE, DARK_BG, FONT_MONO, FONT_SANS, GREEN, LIGHT_TEXT, MUTED_TEXT,
    PANEL_BG, PANEL_BORDER, PURPLE, YELLOW,
};
use crate::theme::Theme;

pub const PANEL_WIDTH: u32 = 450;
pub const PANEL_HEIGHT: u32 = 500;

const CONTENT_LEFT: u32 = 24;
const CONTENT_RIGHT: u32 = PANEL_WIDTH - 24;
const TITLE_BAR_HEIGHT: u32 = 40;
const TRACK_BG: &str = "#132B40";
const ERROR_RED: &str = "#E06C75";
const SYNTAX_KEYWORD: &str = "#C678DD";
const SYNTAX_CALL: &str = "#61AFEF";

/// Returns the panel fragment for `theme`.
pub fn render_panel(theme: Theme) -> String {
    match theme {
        Theme::Cuda => render_dashboard(&CUDA_DASHBOARD),
        Theme::Gpu => render_dashboard(&GPU_DASHBOARD),
        Theme::Python => render_repl(),
        Theme::Neural => render_network(),
        Theme::SimgDefault => render_lab(),
    }
}

fn window_frame(out: &mut String, title: &str) {
    out.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{PANEL_WIDTH}\" height=\"{PANEL_HEIGHT}\" rx=\"18\" fill=\"{PANEL_BG}\" stroke=\"{PANEL_BORDER}\" stroke-width=\"2\" opacity=\"0.95\"/>\n"
    ));
    for (cx, color) in [(24, "#FF5F57"), (44, "#FEBC2E"), (64, "#28C840")] {
        out.push_str(&format!(
            "<circle cx=\"{cx}\" cy=\"20\" r=\"6\" fill=\"{color}\"/>\n"
        ));
    }
    out.push_str(&format!(
        "<text x=\"88\" y=\"25\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"13\">{}</text>\n",
        escape_xml(title)
    ));
    out.push_str(&format!(
        "<line x1=\"0\" y1=\"{TITLE_BAR_HEIGHT}\" x2=\"{PANEL_WIDTH}\" y2=\"{TITLE_BAR_HEIGHT}\" stroke=\"{PANEL_BORDER}\" stroke-width=\"1\"/>\n"
    ));
}

fn section_label(out: &mut String, y: u32, text: &str) {
    out.push_str(&format!(
        "<text x=\"{CONTENT_LEFT}\" y=\"{y}\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\" letter-spacing=\"2\">{}</text>\n",
        escape_xml(text)
    ));
}

fn metric_tiles(out: &mut String, y: u32, accent: &str, tiles: &[(&str, &str); 3]) {
    const TILE_WIDTH: u32 = 124;
    const TILE_GAP: u32 = 15;
    const TILE_HEIGHT: u32 = 76;

    for (index, (label, value)) in tiles.iter().enumerate() {
        let x = CONTENT_LEFT + index as u32 * (TILE_WIDTH + TILE_GAP);
        out.push_str(&format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{TILE_WIDTH}\" height=\"{TILE_HEIGHT}\" rx=\"10\" fill=\"{TRACK_BG}\" stroke=\"{PANEL_BORDER}\"/>\n"
        ));
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" fill=\"{accent}\" font-family=\"{FONT_SANS}\" font-size=\"22\" font-weight=\"bold\">{}</text>\n",
            x + 12,
            y + 36,
            escape_xml(value)
        ));
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"10\" letter-spacing=\"1\">{}</text>\n",
            x + 12,
            y + 60,
            escape_xml(label)
        ));
    }
}

/// A profiler lane: label plus `(start %, width %, color)` blocks.
struct Lane {
    label: &'static str,
    blocks: &'static [(u32, u32, &'static str)],
}

struct DashboardSpec {
    window_title: &'static str,
    accent: &'static str,
    lanes_label: &'static str,
    lanes: &'static [Lane],
    bars_label: &'static str,
    bars: &'static [(&'static str, u32)],
    tiles: [(&'static str, &'static str); 3],
}

const CUDA_DASHBOARD: DashboardSpec = DashboardSpec {
    window_title: "nsight-compute · kernel profile",
    accent: YELLOW,
    lanes_label: "STREAM TIMELINE",
    lanes: &[
        Lane {
            label: "stream 0",
            blocks: &[(0, 22, BLUE), (26, 30, YELLOW), (60, 18, GREEN)],
        },
        Lane {
            label: "stream 1",
            blocks: &[(8, 26, GREEN), (38, 20, BLUE), (64, 30, YELLOW)],
        },
        Lane {
            label: "memcpy",
            blocks: &[(0, 10, PURPLE), (48, 8, PURPLE), (90, 10, PURPLE)],
        },
        Lane {
            label: "sm util",
            blocks: &[(4, 88, GREEN)],
        },
    ],
    bars_label: "KERNEL METRICS",
    bars: &[
        ("occupancy", 87),
        ("warp eff.", 92),
        ("l1 hit rate", 64),
        ("dram util", 71),
    ],
    tiles: [
        ("KERNEL TIME", "1.84 ms"),
        ("THROUGHPUT", "12.4 TF"),
        ("REGS/THREAD", "64"),
    ],
};

const GPU_DASHBOARD: DashboardSpec = DashboardSpec {
    window_title: "memory-hierarchy · bandwidth",
    accent: GREEN,
    lanes_label: "MEMORY TRAFFIC",
    lanes: &[
        Lane {
            label: "registers",
            blocks: &[(0, 96, YELLOW)],
        },
        Lane {
            label: "shared/l1",
            blocks: &[(0, 40, BLUE), (46, 44, BLUE)],
        },
        Lane {
            label: "l2 cache",
            blocks: &[(10, 24, GREEN), (50, 30, GREEN)],
        },
        Lane {
            label: "hbm",
            blocks: &[(0, 12, PURPLE), (40, 12, PURPLE), (80, 12, PURPLE)],
        },
    ],
    bars_label: "BANDWIDTH UTILIZATION",
    bars: &[
        ("registers", 100),
        ("shared mem", 84),
        ("l2 cache", 58),
        ("hbm3", 31),
    ],
    tiles: [("HBM BW", "3.35 TB/s"), ("L2 SIZE", "50 MB"), ("SMS", "132")],
};

fn render_dashboard(spec: &DashboardSpec) -> String {
    const LANES_TOP: u32 = 84;
    const LANE_PITCH: u32 = 34;
    const TRACK_LEFT: u32 = 110;
    const TRACK_WIDTH: u32 = CONTENT_RIGHT - TRACK_LEFT;
    const BAR_LEFT: u32 = 150;
    const BAR_WIDTH: u32 = 230;
    const BAR_PITCH: u32 = 30;

    let mut out = String::new();
    window_frame(&mut out, spec.window_title);

    section_label(&mut out, 70, spec.lanes_label);
    for (index, lane) in spec.lanes.iter().enumerate() {
        let y = LANES_TOP + index as u32 * LANE_PITCH;
        out.push_str(&format!(
            "<text x=\"{CONTENT_LEFT}\" y=\"{}\" fill=\"{LIGHT_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\">{}</text>\n",
            y + 17,
            escape_xml(lane.label)
        ));
        out.push_str(&format!(
            "<rect x=\"{TRACK_LEFT}\" y=\"{y}\" width=\"{TRACK_WIDTH}\" height=\"26\" rx=\"4\" fill=\"{TRACK_BG}\"/>\n"
        ));
        for (start, width, color) in lane.blocks {
            out.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"14\" rx=\"3\" fill=\"{color}\" opacity=\"0.85\"/>\n",
                TRACK_LEFT + TRACK_WIDTH * start / 100,
                y + 6,
                TRACK_WIDTH * width / 100
            ));
        }
    }

    let bars_top = LANES_TOP + spec.lanes.len() as u32 * LANE_PITCH + 30;
    section_label(&mut out, bars_top, spec.bars_label);
    for (index, (label, percent)) in spec.bars.iter().enumerate() {
        let y = bars_top + 16 + index as u32 * BAR_PITCH;
        out.push_str(&format!(
            "<text x=\"{CONTENT_LEFT}\" y=\"{}\" fill=\"{LIGHT_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\">{}</text>\n",
            y + 10,
            escape_xml(label)
        ));
        out.push_str(&format!(
            "<rect x=\"{BAR_LEFT}\" y=\"{y}\" width=\"{BAR_WIDTH}\" height=\"12\" rx=\"6\" fill=\"{TRACK_BG}\"/>\n"
        ));
        out.push_str(&format!(
            "<rect x=\"{BAR_LEFT}\" y=\"{y}\" width=\"{}\" height=\"12\" rx=\"6\" fill=\"{}\"/>\n",
            BAR_WIDTH * percent.min(&100) / 100,
            spec.accent
        ));
        out.push_str(&format!(
            "<text x=\"{CONTENT_RIGHT}\" y=\"{}\" text-anchor=\"end\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\">{percent}%</text>\n",
            y + 10
        ));
    }

    metric_tiles(&mut out, 400, spec.accent, &spec.tiles);
    out
}

enum ReplLine {
    Input(u32, &'static [(&'static str, &'static str)]),
    Output(Option<u32>, &'static str),
}

const REPL_TRANSCRIPT: [ReplLine; 8] = [
    ReplLine::Input(
        1,
        &[
            ("import", SYNTAX_KEYWORD),
            (" numpy ", LIGHT_TEXT),
            ("as", SYNTAX_KEYWORD),
            (" np", LIGHT_TEXT),
        ],
    ),
    ReplLine::Input(
        2,
        &[
            ("x = np.", LIGHT_TEXT),
            ("linspace", SYNTAX_CALL),
            ("(", LIGHT_TEXT),
            ("0", YELLOW),
            (", ", LIGHT_TEXT),
            ("1", YELLOW),
            (", ", LIGHT_TEXT),
            ("1_000_000", YELLOW),
            (")", LIGHT_TEXT),
        ],
    ),
    ReplLine::Input(
        3,
        &[
            ("%timeit", SYNTAX_KEYWORD),
            (" np.", LIGHT_TEXT),
            ("sqrt", SYNTAX_CALL),
            ("(x).", LIGHT_TEXT),
            ("sum", SYNTAX_CALL),
            ("()", LIGHT_TEXT),
        ],
    ),
    ReplLine::Output(None, "1.21 ms ± 8.3 µs per loop"),
    ReplLine::Input(4, &[("import", SYNTAX_KEYWORD), (" torch", LIGHT_TEXT)]),
    ReplLine::Input(
        5,
        &[
            ("t = torch.", LIGHT_TEXT),
            ("from_numpy", SYNTAX_CALL),
            ("(x).", LIGHT_TEXT),
            ("cuda", SYNTAX_CALL),
            ("()", LIGHT_TEXT),
        ],
    ),
    ReplLine::Input(
        6,
        &[
            ("t.", LIGHT_TEXT),
            ("mean", SYNTAX_CALL),
            ("().", LIGHT_TEXT),
            ("item", SYNTAX_CALL),
            ("()", LIGHT_TEXT),
        ],
    ),
    ReplLine::Output(Some(6), "0.5"),
];

fn render_repl() -> String {
    const FIRST_LINE_Y: u32 = 80;
    const LINE_PITCH: u32 = 40;

    let mut out = String::new();
    window_frame(&mut out, "python3 · ipython");

    let mut y = FIRST_LINE_Y;
    for line in &REPL_TRANSCRIPT {
        out.push_str(&format!(
            "<text x=\"{CONTENT_LEFT}\" y=\"{y}\" font-family=\"{FONT_MONO}\" font-size=\"15\">"
        ));
        match line {
            ReplLine::Input(number, tokens) => {
                out.push_str(&format!(
                    "<tspan fill=\"{GREEN}\">In [{number}]: </tspan>"
                ));
                for (text, color) in tokens.iter() {
                    out.push_str(&format!(
                        "<tspan fill=\"{color}\">{}</tspan>",
                        escape_xml(text)
                    ));
                }
            }
            ReplLine::Output(Some(number), text) => {
                out.push_str(&format!(
                    "<tspan fill=\"{ERROR_RED}\">Out[{number}]: </tspan><tspan fill=\"{LIGHT_TEXT}\">{}</tspan>",
                    escape_xml(text)
                ));
            }
            ReplLine::Output(None, text) => {
                out.push_str(&format!(
                    "<tspan fill=\"{MUTED_TEXT}\">{}</tspan>",
                    escape_xml(text)
                ));
            }
        }
        out.push_str("</text>\n");
        y += LINE_PITCH;
    }

    let next_prompt = REPL_TRANSCRIPT
        .iter()
        .filter(|line| matches!(line, ReplLine::Input(..)))
        .count()
        + 1;
    out.push_str(&format!(
        "<text x=\"{CONTENT_LEFT}\" y=\"{y}\" fill=\"{GREEN}\" font-family=\"{FONT_MONO}\" font-size=\"15\">In [{next_prompt}]: </text>\n"
    ));
    out.push_str(&format!(
        "<rect x=\"104\" y=\"{}\" width=\"9\" height=\"18\" fill=\"{YELLOW}\" opacity=\"0.9\"/>\n",
        y - 14
    ));

    out.push_str(&format!(
        "<rect x=\"0\" y=\"466\" width=\"{PANEL_WIDTH}\" height=\"34\" fill=\"{DARK_BG}\" opacity=\"0.6\"/>\n"
    ));
    out.push_str(&format!(
        "<text x=\"{CONTENT_LEFT}\" y=\"488\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\">kernel: Python 3 · cuda:0 available</text>\n"
    ));
    out
}

/// X position of each layer's column, left to right.
const LAYER_X: [f64; 4] = [60.0, 170.0, 280.0, 390.0];
const LAYER_NODES: [usize; 4] = [3, 5, 5, 2];
const LAYER_COLORS: [&str; 4] = [YELLOW, BLUE, BLUE, GREEN];
const LAYER_LABELS: [&str; 4] = ["input", "hidden", "hidden", "output"];
const GRAPH_CENTER_Y: f64 = 250.0;
const NODE_SPACING: f64 = 64.0;
const NODE_RADIUS: f64 = 14.0;

/// Computed geometry of the neural panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLayout {
    /// Node centres per layer.
    pub layers: Vec<Vec<(f64, f64)>>,
    /// Straight connectors between every node pair of adjacent layers.
    pub edges: Vec<((f64, f64), (f64, f64))>,
}

pub fn network_layout() -> NetworkLayout {
    let layers = LAYER_X
        .iter()
        .zip(LAYER_NODES)
        .map(|(&x, count)| {
            let middle = (count as f64 - 1.0) / 2.0;
            (0..count)
                .map(|index| (x, GRAPH_CENTER_Y + (index as f64 - middle) * NODE_SPACING))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let edges = layers
        .windows(2)
        .flat_map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            from.iter()
                .flat_map(move |&a| to.iter().map(move |&b| (a, b)))
        })
        .collect();

    NetworkLayout { layers, edges }
}

fn render_network() -> String {
    let layout = network_layout();
    let mut out = String::new();
    window_frame(&mut out, "unet.forward() · graph view");

    out.push_str(&format!(
        "<g class=\"edges\" stroke=\"{BLUE}\" stroke-width=\"1.5\" opacity=\"0.35\">\n"
    ));
    for ((x1, y1), (x2, y2)) in &layout.edges {
        out.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"/>\n",
            coord(*x1),
            coord(*y1),
            coord(*x2),
            coord(*y2)
        ));
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"nodes\">\n");
    for (layer, color) in layout.layers.iter().zip(LAYER_COLORS) {
        for (x, y) in layer {
            out.push_str(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{color}\" stroke=\"{LIGHT_TEXT}\" stroke-width=\"2\"/>\n",
                coord(*x),
                coord(*y),
                coord(NODE_RADIUS)
            ));
        }
    }
    out.push_str("</g>\n");

    for (x, label) in LAYER_X.iter().zip(LAYER_LABELS) {
        out.push_str(&format!(
            "<text x=\"{}\" y=\"468\" text-anchor=\"middle\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"11\">{label}</text>\n",
            coord(*x)
        ));
    }
    out
}

const LAB_TRACKS: [(&str, u32, &str); 4] = [
    ("Generative models", 72, YELLOW),
    ("Medical imaging", 58, BLUE),
    ("GPU computing", 81, GREEN),
    ("Open source", 45, PURPLE),
];

fn render_lab() -> String {
    const ROWS_TOP: u32 = 100;
    const ROW_PITCH: u32 = 58;
    const TRACK_WIDTH: u32 = CONTENT_RIGHT - CONTENT_LEFT;

    let mut out = String::new();
    window_frame(&mut out, "simg-lab · research tracks");
    section_label(&mut out, 72, "ACTIVE PROJECTS");

    for (index, (label, percent, color)) in LAB_TRACKS.iter().enumerate() {
        let y = ROWS_TOP + index as u32 * ROW_PITCH;
        out.push_str(&format!(
            "<text x=\"{CONTENT_LEFT}\" y=\"{y}\" fill=\"{LIGHT_TEXT}\" font-family=\"{FONT_SANS}\" font-size=\"14\">{}</text>\n",
            escape_xml(label)
        ));
        out.push_str(&format!(
            "<text x=\"{CONTENT_RIGHT}\" y=\"{y}\" text-anchor=\"end\" fill=\"{MUTED_TEXT}\" font-family=\"{FONT_MONO}\" font-size=\"12\">{percent}%</text>\n"
        ));
        out.push_str(&format!(
            "<rect x=\"{CONTENT_LEFT}\" y=\"{}\" width=\"{TRACK_WIDTH}\" height=\"14\" rx=\"7\" fill=\"{TRACK_BG}\"/>\n",
            y + 12
        ));
        out.push_str(&format!(
            "<rect x=\"{CONTENT_LEFT}\" y=\"{}\" width=\"{}\" height=\"14\" rx=\"7\" fill=\"{color}\"/>\n",
            y + 12,
            TRACK_WIDTH * percent / 100
        ));
    }

    section_label(&mut out, 356, "THIS SEMESTER");
    metric_tiles(
        &mut out,
        370,
        YELLOW,
        &[("SESSIONS", "14"), ("MEMBERS", "23"), ("PAPERS", "5")],
    );
    out
}
