use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::{AllocationResult, ReportBranding, ReportInput, ReportRequest};
use crate::utils::format::{currency, signed_pct};

const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_X: f32 = 16.5;
const MARGIN_TOP: f32 = 10.0;
const MARGIN_BOTTOM: f32 = 12.7;
const USABLE_W: f32 = PAGE_W - 2.0 * MARGIN_X;
const PT_TO_MM: f32 = 0.352_78;

const NAVY: u32 = 0x0a1628;
const GOLD: u32 = 0xb8963e;
const BG: u32 = 0xf9f8f6;
const BG2: u32 = 0xf3f1ed;
const BORDER: u32 = 0xe0dcd5;
const ROW_RULE: u32 = 0xeae7e1;
const TEXT: u32 = 0x1c1c1c;
const TEXT2: u32 = 0x555555;
const TEXT3: u32 = 0x999999;
const BAR_MUTED: u32 = 0x8899aa;
const GREEN: u32 = 0x0d6938;
const RED: u32 = 0xa31515;
const WHITE: u32 = 0xffffff;

/// Allocation table columns: index/strategy, weight, index return, credited, est. value.
const COLS: [f32; 5] = [80.0, 20.0, 28.0, 26.0, USABLE_W - 154.0];
const HEADER_ROW_H: f32 = 7.0;
const BODY_ROW_H: f32 = 10.0;
const TITLE_LINE_H: f32 = 3.4;
const DETAIL_LINE_H: f32 = 2.8;

const METHODOLOGY: &str = "Index interest is credited using the annual point-to-point method. \
For strategies with a spread, the spread is deducted from positive index gains first. \
The participation rate is then applied. The cap rate limits the maximum credited return. \
Negative index performance results in a 0% floor - the account value will never decrease \
due to index performance.";

const DISCLOSURES: &str = "This report is prepared for informational purposes only and does not \
constitute an offer to sell, a solicitation to buy, or a recommendation for any security or \
investment advisory service. Estimated values are based on publicly available index data and \
crediting parameters entered by the advisor. Actual credited returns are determined by the \
issuing insurance carrier per your annuity contract. Index returns are not directly investable. \
Past performance does not guarantee future results. Fixed indexed annuities are insurance \
products, not securities. Refer to your annuity contract for complete terms and conditions.";

/// Check a report request before any rendering starts.
pub fn prepare_report(req: ReportRequest, report_date: NaiveDate) -> Result<ReportInput, AppError> {
    let current_value = req
        .current_value
        .filter(|v| *v > 0.0)
        .ok_or_else(|| AppError::Validation("Current value must be > 0".to_string()))?;
    let new_value = req
        .new_value
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| AppError::Validation("New value is required; run the calculation first".to_string()))?;
    if req.allocations.is_empty() {
        return Err(AppError::Validation("At least one allocation is required".to_string()));
    }

    let client_name = req
        .client_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Client".to_string());

    Ok(ReportInput {
        client_name,
        annuity_name: req.annuity_name.unwrap_or_default(),
        current_value,
        new_value,
        allocations: req.allocations,
        index_date: req.index_date.unwrap_or_default(),
        advisor_name: req.advisor_name.unwrap_or_default().trim().to_string(),
        advisor_title: req.advisor_title.unwrap_or_default().trim().to_string(),
        report_date,
    })
}

fn rgb(hex: u32) -> Color {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

/// Approximate Helvetica advance width in thousandths of an em.
fn glyph_width(ch: char, bold: bool) -> f32 {
    match ch {
        '0'..='9' | '$' | '_' => 556.0,
        ' ' | ',' | '.' | '/' | ':' | ';' | '!' => 278.0,
        '%' => 889.0,
        '+' | '=' => 584.0,
        '-' | '(' | ')' => 333.0,
        '|' => if bold { 280.0 } else { 260.0 },
        '&' => 722.0,
        'i' | 'j' | 'l' => if bold { 278.0 } else { 222.0 },
        'm' | 'w' => 833.0,
        'M' | 'W' => 880.0,
        'A'..='Z' => if bold { 722.0 } else { 667.0 },
        'a'..='z' => if bold { 580.0 } else { 520.0 },
        _ => 556.0,
    }
}

fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    text.chars().map(|c| glyph_width(c, bold)).sum::<f32>() / 1000.0 * size * PT_TO_MM
}

/// Greedy word wrap to `max_width` millimetres.
fn wrap(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() { word.to_string() } else { format!("{} {}", line, word) };
        if !line.is_empty() && text_width(&candidate, size, bold) > max_width {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

/// Cursor-based page writer. `y` is the top of the free area, measured from the page bottom.
struct Composer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Composer {
    fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Report(format!("font error: {:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Report(format!("font error: {:?}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self { doc, layer, regular, bold, y: PAGE_H - MARGIN_TOP, pages: 1 })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN_TOP;
        self.pages += 1;
    }

    /// Start a new page when fewer than `height` mm remain. Returns true on a break.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height < MARGIN_BOTTOM {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn rect(&self, x: f32, bottom: f32, width: f32, height: f32, color: u32) {
        self.layer.set_fill_color(rgb(color));
        self.layer.add_rect(Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(bottom + height)));
    }

    /// Filled box with a thin border.
    fn boxed(&self, x: f32, bottom: f32, width: f32, height: f32, fill: u32) {
        self.rect(x, bottom, width, height, BORDER);
        self.rect(x + 0.18, bottom + 0.18, width - 0.36, height - 0.36, fill);
    }

    fn rule(&mut self, thickness: f32, color: u32) {
        self.rect(MARGIN_X, self.y - thickness, USABLE_W, thickness, color);
        self.y -= thickness;
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&self, s: &str, size: f32, bold: bool, color: u32, x: f32, baseline: f32, align: Align) {
        let width = text_width(s, size, bold);
        let start = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(s, size, Mm(start), Mm(baseline), font);
    }

    fn finish(self) -> Result<Vec<u8>, AppError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::Report(format!("failed to write PDF: {:?}", e)))
    }
}

fn advisor_line(input: &ReportInput, branding: &ReportBranding) -> String {
    if input.advisor_name.is_empty() {
        return branding.firm_name.clone();
    }
    if input.advisor_title.is_empty() {
        input.advisor_name.clone()
    } else {
        format!("{}  |  {}", input.advisor_name, input.advisor_title)
    }
}

fn pct_color(value: f64) -> u32 {
    if value > 0.0 {
        GREEN
    } else if value < 0.0 {
        RED
    } else {
        TEXT
    }
}

fn rate_summary(alloc: &AllocationResult) -> String {
    let mut parts = Vec::new();
    if let Some(spread) = alloc.spread_rate.filter(|v| *v != 0.0) {
        parts.push(format!("Spread {:.2}%", spread));
    }
    if let Some(par) = alloc.par_rate.filter(|v| *v != 0.0) {
        parts.push(format!("Par {:.0}%", par));
    }
    if let Some(cap) = alloc.cap_rate.filter(|v| *v != 0.0) {
        parts.push(format!("Cap {:.2}%", cap));
    }
    parts.join("  |  ")
}

fn draw_header(c: &mut Composer, input: &ReportInput, branding: &ReportBranding) {
    c.text(&branding.firm_name, 14.0, true, NAVY, MARGIN_X, c.y - 6.0, Align::Left);
    c.y -= 11.0;

    let bar_h = 9.0;
    c.rect(MARGIN_X, c.y - bar_h, USABLE_W, bar_h, NAVY);
    let baseline = c.y - bar_h / 2.0 - 1.0;
    c.text(&advisor_line(input, branding), 7.5, true, WHITE, MARGIN_X + 5.0, baseline, Align::Left);
    c.text(&branding.firm_name, 7.0, false, BAR_MUTED, MARGIN_X + USABLE_W - 5.0, baseline, Align::Right);
    c.y -= bar_h;
    c.rule(0.53, GOLD);
    c.y -= 6.0;

    c.text("Annuity Performance Report", 22.0, true, NAVY, MARGIN_X, c.y - 7.5, Align::Left);
    c.y -= 11.0;
    let prepared = format!(
        "Prepared for {}  |  {}",
        input.client_name,
        input.report_date.format("%B %d, %Y")
    );
    c.text(&prepared, 9.0, false, TEXT3, MARGIN_X, c.y - 3.0, Align::Left);
    c.y -= 9.0;

    let half = USABLE_W / 2.0;
    c.text("PRODUCT", 7.0, true, TEXT3, MARGIN_X, c.y - 2.5, Align::Left);
    c.text("MEASUREMENT PERIOD", 7.0, true, TEXT3, MARGIN_X + half, c.y - 2.5, Align::Left);
    c.text(&input.annuity_name, 9.5, true, TEXT, MARGIN_X, c.y - 7.0, Align::Left);
    c.text(&input.index_date, 9.5, true, TEXT, MARGIN_X + half, c.y - 7.0, Align::Left);
    c.y -= 11.0;
    c.rule(0.26, GOLD);
    c.y -= 5.0;
}

fn draw_summary_cards(c: &mut Composer, input: &ReportInput) {
    let total_return = input.total_return_pct();
    let gain = input.gain();
    let sign = if total_return >= 0.0 { "+" } else { "-" };
    let return_color = if total_return >= 0.0 { GREEN } else { RED };

    let cards = [
        ("CURRENT ACCOUNT VALUE", currency(input.current_value), String::new(), NAVY),
        (
            "ESTIMATED UPDATED VALUE",
            currency(input.new_value),
            format!("{}{}", sign, currency(gain.abs())),
            NAVY,
        ),
        (
            "ESTIMATED PERIOD RETURN",
            format!("{}{:.2}%", sign, total_return.abs()),
            "Since last anniversary".to_string(),
            return_color,
        ),
    ];

    let card_h = 24.0;
    let card_w = USABLE_W / 3.0;
    c.boxed(MARGIN_X, c.y - card_h, USABLE_W, card_h, BG);
    for (i, (label, value, sub, color)) in cards.iter().enumerate() {
        let x = MARGIN_X + card_w * i as f32;
        if i > 0 {
            c.rect(x - 0.09, c.y - card_h, 0.18, card_h, BORDER);
        }
        c.text(label, 7.5, true, TEXT3, x + 5.0, c.y - 7.0, Align::Left);
        c.text(value, 20.0, true, *color, x + 5.0, c.y - 15.0, Align::Left);
        if !sub.is_empty() {
            c.text(sub, 9.0, false, TEXT2, x + 5.0, c.y - 20.5, Align::Left);
        }
    }
    c.y -= card_h + 6.0;
}

fn column_edges() -> [f32; 6] {
    let mut edges = [MARGIN_X; 6];
    for i in 0..5 {
        edges[i + 1] = edges[i] + COLS[i];
    }
    edges
}

fn draw_table_header(c: &mut Composer) {
    let e = column_edges();
    c.rect(MARGIN_X, c.y - HEADER_ROW_H, USABLE_W, HEADER_ROW_H, BG2);
    let baseline = c.y - HEADER_ROW_H / 2.0 - 0.8;
    c.text("INDEX / STRATEGY", 6.5, true, TEXT3, e[0] + 3.0, baseline, Align::Left);
    for (i, label) in ["WEIGHT", "INDEX RETURN", "CREDITED", "EST. VALUE"].iter().enumerate() {
        c.text(label, 6.5, true, TEXT3, e[i + 2] - 3.0, baseline, Align::Right);
    }
    c.y -= HEADER_ROW_H;
    c.rule(0.53, GOLD);
}

/// Wrapped strategy title and the small rate line printed under it.
fn row_title(alloc: &AllocationResult) -> (Vec<String>, String) {
    let (title, detail) = if alloc.is_fixed {
        ("Fixed Interest".to_string(), format!("Rate: {:.2}%", alloc.fixed_rate.unwrap_or(0.0)))
    } else {
        (alloc.name.clone(), rate_summary(alloc))
    };
    let mut lines = wrap(&title, 8.0, true, COLS[0] - 6.0);
    if lines.is_empty() {
        lines.push(title);
    }
    (lines, detail)
}

fn title_block_height(title_lines: usize, has_detail: bool) -> f32 {
    let detail = if has_detail { DETAIL_LINE_H + 0.6 } else { 0.0 };
    title_lines as f32 * TITLE_LINE_H + detail
}

fn row_height(title_lines: usize, has_detail: bool) -> f32 {
    BODY_ROW_H.max(title_block_height(title_lines, has_detail) + 3.0)
}

fn draw_allocation_row(c: &mut Composer, alloc: &AllocationResult) {
    let (title_lines, detail) = row_title(alloc);
    let height = row_height(title_lines.len(), !detail.is_empty());
    if c.ensure_space(height) {
        draw_table_header(c);
    }
    let e = column_edges();
    let baseline = c.y - height / 2.0 - 1.0;
    let index_cell = if alloc.is_fixed { None } else { Some(alloc.index_return.unwrap_or(0.0)) };

    let block = title_block_height(title_lines.len(), !detail.is_empty());
    let mut line_baseline = c.y - (height - block) / 2.0 - 2.6;
    for line in &title_lines {
        c.text(line, 8.0, true, TEXT, e[0] + 3.0, line_baseline, Align::Left);
        line_baseline -= TITLE_LINE_H;
    }
    if !detail.is_empty() {
        c.text(&detail, 6.0, false, TEXT3, e[0] + 3.0, line_baseline, Align::Left);
    }

    c.text(&format!("{:.0}%", alloc.allocation_pct), 8.0, false, TEXT, e[2] - 3.0, baseline, Align::Right);
    match index_cell {
        Some(r) => c.text(&signed_pct(r), 8.0, false, if r >= 0.0 { GREEN } else { RED }, e[3] - 3.0, baseline, Align::Right),
        None => c.text("--", 8.0, false, TEXT3, e[3] - 3.0, baseline, Align::Right),
    }
    c.text(
        &signed_pct(alloc.credited_return),
        8.0,
        false,
        pct_color(alloc.credited_return),
        e[4] - 3.0,
        baseline,
        Align::Right,
    );
    c.text(&currency(alloc.new_amount), 8.0, true, TEXT, e[5] - 3.0, baseline, Align::Right);

    c.y -= height;
    c.rule(0.18, ROW_RULE);
}

fn draw_total_row(c: &mut Composer, input: &ReportInput) {
    if c.ensure_space(BODY_ROW_H + 0.6) {
        draw_table_header(c);
    }
    let e = column_edges();
    let total_return = input.total_return_pct();
    let sign = if total_return >= 0.0 { "+" } else { "-" };

    c.rule(0.53, NAVY);
    c.rect(MARGIN_X, c.y - BODY_ROW_H, USABLE_W, BODY_ROW_H, BG);
    let baseline = c.y - BODY_ROW_H / 2.0 - 1.0;
    c.text("TOTAL", 8.0, true, TEXT, e[0] + 3.0, baseline, Align::Left);
    c.text("100%", 8.0, true, TEXT, e[2] - 3.0, baseline, Align::Right);
    c.text(
        &format!("{}{:.2}%", sign, total_return.abs()),
        8.0,
        true,
        if total_return >= 0.0 { GREEN } else { RED },
        e[4] - 3.0,
        baseline,
        Align::Right,
    );
    c.text(&currency(input.new_value), 8.0, true, TEXT, e[5] - 3.0, baseline, Align::Right);
    c.y -= BODY_ROW_H + 6.0;
}

fn draw_methodology(c: &mut Composer) {
    let lines = wrap(METHODOLOGY, 7.5, false, USABLE_W - 10.0);
    let height = 10.0 + lines.len() as f32 * 3.6;
    c.ensure_space(height);
    c.boxed(MARGIN_X, c.y - height, USABLE_W, height, BG);
    c.text("CREDITING METHODOLOGY", 7.0, true, NAVY, MARGIN_X + 5.0, c.y - 5.0, Align::Left);
    let mut baseline = c.y - 9.0;
    for line in &lines {
        c.text(line, 7.5, false, TEXT2, MARGIN_X + 5.0, baseline, Align::Left);
        baseline -= 3.6;
    }
    c.y -= height + 6.0;
}

fn draw_disclosures(c: &mut Composer) {
    let lines = wrap(DISCLOSURES, 6.0, false, USABLE_W);
    c.ensure_space(8.0 + lines.len() as f32 * 2.9);
    c.rule(0.18, GOLD);
    c.y -= 2.5;
    c.text("Important Disclosures", 6.5, true, TEXT3, MARGIN_X, c.y - 2.5, Align::Left);
    c.y -= 5.0;
    for line in &lines {
        c.text(line, 6.0, false, TEXT3, MARGIN_X, c.y - 2.2, Align::Left);
        c.y -= 2.9;
    }
    c.y -= 5.0;
}

fn draw_footer(c: &mut Composer, input: &ReportInput, branding: &ReportBranding) {
    let bar_h = 9.0;
    c.ensure_space(bar_h);
    c.rect(MARGIN_X, c.y - bar_h, USABLE_W, bar_h, NAVY);
    let baseline = c.y - bar_h / 2.0 - 1.0;
    c.text(&advisor_line(input, branding), 7.0, true, WHITE, MARGIN_X + 5.0, baseline, Align::Left);
    c.text(&branding.firm_address, 6.0, false, BAR_MUTED, MARGIN_X + USABLE_W / 2.0, baseline, Align::Center);
    c.text(
        &format!("{}  |  {}", branding.firm_name, input.report_date.format("%B %d, %Y")),
        6.0,
        false,
        BAR_MUTED,
        MARGIN_X + USABLE_W - 5.0,
        baseline,
        Align::Right,
    );
    c.y -= bar_h;
}

/// Compose the client-facing performance report as PDF bytes. Pure presentation: all
/// figures come from `input` as given.
pub fn render_report(input: &ReportInput, branding: &ReportBranding) -> Result<Vec<u8>, AppError> {
    let mut c = Composer::new(&format!("Annuity Performance Report - {}", input.client_name))?;

    draw_header(&mut c, input, branding);
    draw_summary_cards(&mut c, input);

    c.ensure_space(6.0 + HEADER_ROW_H + BODY_ROW_H);
    c.text("ALLOCATION DETAIL", 8.0, true, NAVY, MARGIN_X, c.y - 3.0, Align::Left);
    c.y -= 6.0;
    draw_table_header(&mut c);
    for alloc in &input.allocations {
        draw_allocation_row(&mut c, alloc);
    }
    draw_total_row(&mut c, input);

    draw_methodology(&mut c);
    draw_disclosures(&mut c);
    draw_footer(&mut c, input, branding);

    info!(
        "Rendered report for {} ({} allocations, {} page(s))",
        input.client_name,
        input.allocations.len(),
        c.pages
    );
    c.finish()
}
