// ==========================================
// SIGLAB Aviário - SVG 图表渲染
// ==========================================
// 职责: 月度产量折线图 / 分鸡舍产蛋率柱状图 / 周龄产蛋曲线
// 说明: 手写 SVG，平滑曲线使用三次贝塞尔 "C cx,y1 cx,y2 x2,y2"
// ==========================================

use crate::domain::types::AviaryId;
use crate::engine::dashboard::{AviaryStats, MaturityCurve, MonthlyBucket};
use crate::engine::filter::MONTHS_SHORT;
use std::fmt::{self, Write};

/// 合计曲线颜色
pub const TOTAL_COLOR: &str = "#2563eb";

/// 鸡舍配色（1..=4）
pub const AVIARY_COLORS: [&str; 4] = ["#3b82f6", "#10b981", "#f59e0b", "#a855f7"];

/// 周龄曲线轮换配色
pub const MATURITY_COLORS: [&str; 5] = ["#2563eb", "#f59e0b", "#10b981", "#a855f7", "#ef4444"];

pub fn aviary_color(aviary: AviaryId) -> &'static str {
    AVIARY_COLORS[aviary.index()]
}

// ── 工具函数 ──────────────────────────────────────────────────────────

/// 坐标格式化：最多两位小数，去掉多余的 0
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 平滑路径
///
/// 相邻两点之间使用水平切线的三次贝塞尔（控制点 x 取中点）
pub fn smooth_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    let Some(&(x0, y0)) = points.first() else {
        return d;
    };
    d.push_str(&format!("M {},{}", num(x0), num(y0)));
    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let cx = (x1 + x2) / 2.0;
        d.push_str(&format!(
            " C {},{} {},{} {},{}",
            num(cx),
            num(y1),
            num(cx),
            num(y2),
            num(x2),
            num(y2)
        ));
    }
    d
}

/// 纵轴上限：向上取整到千位，无数据时为 1000
pub fn line_chart_y_max(max_value: u64) -> u64 {
    let max_value = if max_value == 0 { 100 } else { max_value };
    let rounded = max_value.div_ceil(1000) * 1000;
    if rounded == 0 {
        1000
    } else {
        rounded
    }
}

fn open_svg(out: &mut String, width: u32, height: u32) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif">"#,
        w = width,
        h = height
    )
}

// ── 月度产量折线图 ──────────────────────────────────────────────────────

/// 月度产量折线图
///
/// # 参数
/// - buckets: 12 个月桶
/// - aviary: Some 时只画该鸡舍，None 时画合计
pub fn render_monthly_line_chart(
    buckets: &[MonthlyBucket],
    aviary: Option<AviaryId>,
) -> Result<String, fmt::Error> {
    let (width, height) = (800.0, 250.0);
    let (pad_left, pad_right, pad_top, pad_bottom) = (60.0, 40.0, 30.0, 40.0);

    let max_value = buckets.iter().map(|b| b.value_for(aviary)).max().unwrap_or(0);
    let y_max = line_chart_y_max(max_value) as f64;
    let get_x = |i: usize| pad_left + i as f64 * (width - pad_left - pad_right) / 11.0;
    let get_y = |v: f64| height - pad_bottom - (v / y_max) * (height - pad_bottom - pad_top);
    let color = aviary.map(aviary_color).unwrap_or(TOTAL_COLOR);

    let mut out = String::new();
    open_svg(&mut out, width as u32, height as u32)?;

    // 网格与刻度
    for step in 0..=4 {
        let value = y_max * f64::from(step) / 4.0;
        let y = get_y(value);
        writeln!(
            out,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#f1f5f9\" stroke-width=\"1\" />",
            num(pad_left),
            num(y),
            num(width - pad_right),
            num(y)
        )?;
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#9ca3af\">{}</text>",
            num(pad_left - 10.0),
            num(y + 4.0),
            num(value)
        )?;
    }

    let points: Vec<(f64, f64)> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (get_x(i), get_y(b.value_for(aviary) as f64)))
        .collect();

    writeln!(
        out,
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"3\" stroke-linecap=\"round\" />",
        smooth_path(&points),
        color
    )?;
    for (x, y) in &points {
        writeln!(
            out,
            "  <circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"#ffffff\" stroke=\"{}\" stroke-width=\"2\" />",
            num(*x),
            num(*y),
            color
        )?;
    }

    for (i, month) in MONTHS_SHORT.iter().enumerate() {
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#9ca3af\">{}</text>",
            num(get_x(i)),
            num(height - 10.0),
            month
        )?;
    }

    out.push_str("</svg>\n");
    Ok(out)
}

// ── 分鸡舍产蛋率柱状图 ────────────────────────────────────────────────

pub fn render_laying_rate_bar_chart(stats: &[AviaryStats]) -> Result<String, fmt::Error> {
    let (width, height, pad) = (900.0, 280.0, 60.0);
    let chart_w = width - pad * 2.0;
    let chart_h = height - pad * 1.5 - 20.0;
    let bar_width = 70.0;

    let mut out = String::new();
    open_svg(&mut out, width as u32, height as u32)?;
    writeln!(
        out,
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#f1f5f9\" stroke-width=\"1\" />",
        num(pad),
        num(height - pad),
        num(width - pad),
        num(height - pad)
    )?;

    for (i, av) in stats.iter().enumerate() {
        let x = pad + i as f64 * chart_w / 3.0 - bar_width / 2.0;
        let bar_height = (av.laying_rate / 100.0 * chart_h).max(5.0);
        let y = height - pad - bar_height;
        let color = aviary_color(av.aviary_id);

        writeln!(
            out,
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"16\" fill=\"{}\" opacity=\"0.8\" />",
            num(x),
            num(y),
            num(bar_width),
            num(bar_height),
            color
        )?;
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\" fill=\"{}\">{:.1}%</text>",
            num(x + bar_width / 2.0),
            num(y - 10.0),
            color,
            av.laying_rate
        )?;
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#6b7280\">AV.{}</text>",
            num(x + bar_width / 2.0),
            num(height - pad + 25.0),
            av.aviary_id
        )?;
    }

    out.push_str("</svg>\n");
    Ok(out)
}

// ── 周龄产蛋曲线 ────────────────────────────────────────────────────────

/// 横轴上限：至少 80 周，超出时按 10 周向上取整
pub fn maturity_max_age(curves: &[MaturityCurve]) -> i64 {
    let oldest = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.age_weeks))
        .max()
        .unwrap_or(0);
    if oldest > 80 {
        (oldest + 9) / 10 * 10
    } else {
        80
    }
}

pub fn render_maturity_chart(curves: &[MaturityCurve]) -> Result<String, fmt::Error> {
    let (width, height) = (1000.0, 350.0);
    let (pad_left, pad_right, pad_top, pad_bottom) = (70.0, 30.0, 10.0, 70.0);
    let chart_w = width - pad_left - pad_right;
    let chart_h = height - pad_top - pad_bottom;

    let max_age = maturity_max_age(curves);
    let get_x = |age: i64| pad_left + (age as f64 / max_age as f64) * chart_w;
    let get_y = |rate: f64| height - pad_bottom - (rate.min(100.0) / 100.0) * chart_h;

    let mut out = String::new();
    open_svg(&mut out, width as u32, height as u32)?;

    for age in (0..=120).step_by(10).filter(|a| *a <= max_age) {
        writeln!(
            out,
            "  <line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"#f1f5f9\" stroke-width=\"1\" />",
            num(pad_top),
            num(get_y(0.0)),
            x = num(get_x(age))
        )?;
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#9ca3af\">{}</text>",
            num(get_x(age)),
            num(get_y(0.0) + 18.0),
            age
        )?;
    }
    writeln!(
        out,
        "  <line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"#1f2937\" stroke-width=\"2\" />",
        num(pad_left),
        num(width - pad_right),
        y = num(get_y(0.0))
    )?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = MATURITY_COLORS[idx % MATURITY_COLORS.len()];
        match curve.points.as_slice() {
            [] => continue,
            [only] => {
                writeln!(
                    out,
                    "  <circle cx=\"{}\" cy=\"{}\" r=\"5\" fill=\"{}\" />",
                    num(get_x(only.age_weeks)),
                    num(get_y(only.laying_rate)),
                    color
                )?;
            }
            points => {
                let coords: Vec<(f64, f64)> = points
                    .iter()
                    .map(|p| (get_x(p.age_weeks), get_y(p.laying_rate)))
                    .collect();
                writeln!(
                    out,
                    "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"3\" />",
                    smooth_path(&coords),
                    color
                )?;
            }
        }
        // 图例
        writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"{}\">{}</text>",
            num(pad_left + idx as f64 * 120.0),
            num(height - 15.0),
            color,
            escape_xml(&curve.batch_id)
        )?;
    }

    out.push_str("</svg>\n");
    Ok(out)
}
