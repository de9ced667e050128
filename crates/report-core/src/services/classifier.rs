//! Keyword classification of Q&A records

use crate::constants::CLASSIFY_ANSWER_PROBE_CHARS;
use report_types::{Category, ClassifiedReport, QaRecord};

/// Ordered classification rules. The first rule with a matching keyword
/// assigns the category; records matching none fall into `Other`.
pub const CLASSIFICATION_RULES: &[(Category, &[&str])] = &[
    (
        Category::Financial,
        &[
            "收入", "利润", "负债", "资产", "现金流", "毛利", "股息", "财务", "盈利", "营收",
            "EBITDA", "成本", "费用", "税收",
        ],
    ),
    (
        Category::Business,
        &[
            "业务", "运营", "项目", "市场", "产品", "服务", "战略", "投资", "合作", "布局",
            "发展", "扩张", "竞争",
        ],
    ),
    (
        Category::Analysis,
        &["分析", "操纵", "风险", "评估", "模型", "指标", "比率", "趋势", "预测", "展望"],
    ),
    (
        Category::Management,
        &["管理层", "高管", "董事", "薪酬", "激励", "员工", "人事", "变动", "任命", "离职"],
    ),
    (
        Category::Governance,
        &["治理", "合规", "监管", "审计", "内控", "制度", "规范", "透明度", "责任"],
    ),
];

/// Text the rules are matched against: the question plus the start of the answer
pub fn probe_text(record: &QaRecord) -> String {
    let answer_head: String = record.answer.chars().take(CLASSIFY_ANSWER_PROBE_CHARS).collect();
    format!("{} {}", record.question, answer_head)
}

/// Category of a single record
pub fn categorize(record: &QaRecord) -> Category {
    let probe = probe_text(record);

    CLASSIFICATION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| probe.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Group records by category, keeping their relative order.
/// Records with a blank question or answer are dropped.
pub fn classify<'a, I>(records: I) -> ClassifiedReport
where
    I: IntoIterator<Item = &'a QaRecord>,
{
    let mut report = ClassifiedReport::new();

    for record in records {
        let Some(record) = QaRecord::new(&record.question, &record.answer) else {
            continue;
        };
        report.push(categorize(&record), record);
    }

    log::debug!(
        "Classified {} records: {}",
        report.total(),
        report
            .iter()
            .map(|(category, records)| format!("{}={}", category, records.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    report
}
