// ==========================================
// SIGLAB Aviário - 日产指标计算
// ==========================================
// 职责: 总蛋数 / 品质占比 / 产蛋率
// 规则:
// - 总蛋数 = 净蛋 + 脏蛋 + 破蛋 + 地面蛋
// - 除数为 0 时对应指标为 0
// - 表单路径全部保留 1 位小数；导入路径仅产蛋率保留 1 位小数
// ==========================================

use crate::domain::production::{EggCounts, ProductionMetrics};
use crate::domain::types::AviaryId;

/// 保留 1 位小数（四舍五入）
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 百分比（total 为 0 时返回 0）
pub fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(total) * 100.0
    }
}

/// 产蛋率（存栏为 0 时返回 0）
pub fn laying_rate(total_eggs: u32, live_birds: u32) -> f64 {
    percentage(total_eggs, live_birds)
}

/// 无地面蛋的鸡舍强制清零地面蛋
pub fn effective_egg_counts(aviary: AviaryId, counts: EggCounts) -> EggCounts {
    if aviary.has_floor_eggs() {
        counts
    } else {
        EggCounts { floor: 0, ..counts }
    }
}

/// 计算未取整指标
pub fn compute_metrics(counts: EggCounts, live_birds: u32) -> ProductionMetrics {
    let total = counts.total();
    ProductionMetrics {
        total_eggs: total,
        clean_percentage: percentage(counts.clean, total),
        dirty_percentage: percentage(counts.dirty, total),
        cracked_percentage: percentage(counts.cracked, total),
        floor_percentage: percentage(counts.floor, total),
        laying_rate: laying_rate(total, live_birds),
    }
}

/// 表单保存使用的指标：所有比率保留 1 位小数
pub fn compute_form_metrics(counts: EggCounts, live_birds: u32) -> ProductionMetrics {
    let raw = compute_metrics(counts, live_birds);
    ProductionMetrics {
        total_eggs: raw.total_eggs,
        clean_percentage: round1(raw.clean_percentage),
        dirty_percentage: round1(raw.dirty_percentage),
        cracked_percentage: round1(raw.cracked_percentage),
        floor_percentage: round1(raw.floor_percentage),
        laying_rate: round1(raw.laying_rate),
    }
}

/// CSV 导入使用的指标：仅产蛋率取整
pub fn compute_import_metrics(counts: EggCounts, live_birds: u32) -> ProductionMetrics {
    let mut metrics = compute_metrics(counts, live_birds);
    metrics.laying_rate = round1(metrics.laying_rate);
    metrics
}
