//! Fixed reference tables: keyword sets, the location gazetteer, team-name
//! patterns and the college profiles used to enrich team records.

use std::sync::OnceLock;

use crate::rules::RuleList;

pub const UNDETERMINED: &str = "待定";
pub const SEE_DETAILS: &str = "详见正文";
pub const DEFAULT_TEAM: &str = "北师大支教队";
pub const INSTITUTION: &str = "北师大";
pub const SQUAD_SUFFIX: &str = "支教队";
pub const ELLIPSIS: &str = "...";

/// Title substrings that mark a row as a recruitment post.
pub const RECRUIT_KEYWORDS: &[&str] = &["招募", "支教", "志愿", "报名", "申请"];

pub const URGENCY_KEYWORDS: &[&str] = &["紧急", "急需", "立即", "马上", "截止"];

/// Title words that never belong to a squad name. Team-name rules treat them
/// as word boundaries.
pub const TITLE_NOISE: &[&str] = &[
    "招募", "志愿", "报名", "申请", "紧急", "急需", "立即", "马上", "截止", "关于",
];

/// Title substrings the team page uses to preselect team articles.
pub const TEAM_MARKERS: &[&str] = &["支教队", "支教团"];

pub const PROVINCES: &[&str] = &[
    "内蒙古", "黑龙江", "甘肃", "云南", "贵州", "四川", "西藏", "青海", "新疆", "宁夏",
    "广西", "河北", "山西", "陕西", "河南", "湖南", "湖北", "江西", "安徽", "重庆", "海南",
    "吉林", "辽宁", "山东", "福建", "浙江", "江苏", "广东", "北京", "天津", "上海",
];

pub const MAJOR_CITIES: &[&str] = &[
    "呼和浩特", "乌鲁木齐", "兰州", "昆明", "贵阳", "成都", "拉萨", "西宁", "银川", "南宁",
    "西安", "郑州", "长沙", "武汉", "南昌", "合肥", "太原", "石家庄",
];

/// Region-specific prefectures and counties where teams actually serve.
pub const REGIONAL_CITIES: &[&[&str]] = &[
    &["临夏", "定西", "天水", "陇南", "甘南", "积石山"],
    &["毕节", "黔东南", "黔南", "黔西南", "遵义", "铜仁", "六盘水"],
    &["大理", "曲靖", "昭通", "红河", "文山", "怒江", "东川"],
    &["喀什", "和田", "阿克苏", "伊犁"],
    &["凉山", "甘孜", "阿坝"],
    &["日喀则", "林芝", "山南", "那曲"],
];

pub const OTHER_REGION: &str = "其他";

/// Landing-page regions and the provinces they group.
pub const REGIONS: &[(&str, &[&str])] = &[
    ("西南地区", &["云南", "贵州", "四川", "西藏", "重庆"]),
    ("西北地区", &["甘肃", "青海", "新疆", "宁夏", "陕西"]),
    ("华北地区", &["北京", "天津", "河北", "山西", "内蒙古"]),
];

/// Words counted for the landing-page keyword list, in tie-break order.
pub const STORY_KEYWORDS: &[&str] = &[
    "孩子", "山区", "陪伴", "教育", "温暖", "成长", "青春", "梦想", "希望", "爱心",
    "志愿", "奉献", "责任", "感动", "收获", "坚持", "支持", "帮助", "快乐", "未来",
];

pub fn region_of(province: &str) -> &'static str {
    REGIONS
        .iter()
        .find(|(_, provinces)| provinces.contains(&province))
        .map_or(OTHER_REGION, |(region, _)| *region)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollegeProfile {
    pub name: &'static str,
    pub slogan: &'static str,
    pub location: &'static str,
    pub coordinates: (f64, f64),
    pub established_year: i32,
}

pub const COLLEGES: &[CollegeProfile] = &[
    CollegeProfile {
        name: "历史学院",
        slogan: "用知识点亮山区孩子的梦想",
        location: "贵州黔东南",
        coordinates: (26.5847, 107.9772),
        established_year: 2014,
    },
    CollegeProfile {
        name: "地理学院",
        slogan: "用地理看世界，用爱心暖人心",
        location: "甘肃临夏",
        coordinates: (35.5993, 103.2107),
        established_year: 2016,
    },
    CollegeProfile {
        name: "文学院",
        slogan: "以文化人，以德育人",
        location: "云南大理",
        coordinates: (25.6056, 100.2675),
        established_year: 2012,
    },
    CollegeProfile {
        name: "心理学院",
        slogan: "用心陪伴每一次成长",
        location: "云南昆明",
        coordinates: (25.0389, 102.7183),
        established_year: 2015,
    },
    CollegeProfile {
        name: "数学学院",
        slogan: "让逻辑之光照进山村课堂",
        location: "贵州毕节",
        coordinates: (27.3025, 105.2863),
        established_year: 2013,
    },
    CollegeProfile {
        name: "英语学院",
        slogan: "打开一扇看世界的窗",
        location: "新疆喀什",
        coordinates: (39.4677, 75.9938),
        established_year: 2017,
    },
];

pub const OTHER_COLLEGE: &str = "其他学院";
pub const OTHER_SLOGAN: &str = "用青春点亮希望";
/// Placeholder map position for teams without a known home region.
pub const OTHER_COORDINATES: (f64, f64) = (35.0, 105.0);

pub const HONORS_ESTABLISHED: &[&str] = &["年度优秀支教团队", "社会实践先进集体"];
pub const HONORS_EMERGING: &[&str] = &["支教服务贡献奖"];

/// First known college whose name appears in `text`, in table order.
pub fn find_college(text: &str) -> Option<&'static CollegeProfile> {
    COLLEGES.iter().find(|c| text.contains(c.name))
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// Provinces, then major cities, then each regional list. Earlier rules win.
pub fn gazetteer() -> &'static RuleList {
    static RULES: OnceLock<RuleList> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut rules = vec![
            ("province".to_string(), alternation(PROVINCES)),
            ("major_city".to_string(), alternation(MAJOR_CITIES)),
        ];
        for (idx, cities) in REGIONAL_CITIES.iter().enumerate() {
            rules.push((format!("regional_{}", idx), alternation(cities)));
        }
        RuleList::compile(rules).expect("gazetteer patterns are valid")
    })
}

/// Province rule alone, used for coverage counts.
pub fn provinces() -> &'static RuleList {
    static RULES: OnceLock<RuleList> = OnceLock::new();
    RULES.get_or_init(|| {
        RuleList::compile(vec![("province".to_string(), alternation(PROVINCES))])
            .expect("province pattern is valid")
    })
}

/// College-, department-, institution-qualified squads, then any squad suffix.
pub fn team_names() -> &'static RuleList {
    static RULES: OnceLock<RuleList> = OnceLock::new();
    RULES.get_or_init(|| {
        RuleList::compile(vec![
            (
                "college".to_string(),
                r"\p{Han}{1,8}学院\p{Han}{0,4}?支教[队团]".to_string(),
            ),
            (
                "department".to_string(),
                r"\p{Han}{1,8}[系部]\p{Han}{0,4}?支教[队团]".to_string(),
            ),
            (
                "institution".to_string(),
                r"\p{Han}{2,10}(?:大学|学校|中心)\p{Han}{0,4}?支教[队团]".to_string(),
            ),
            ("generic".to_string(), r"[\p{Han}0-9]{0,8}?支教[队团]".to_string()),
        ])
        .expect("team-name patterns are valid")
    })
}

/// First team name in `title`. Recruiting and urgency words are masked first,
/// so "紧急招募地理学院支教队" yields "地理学院支教队".
pub fn find_team_name(title: &str) -> Option<String> {
    let masked = TITLE_NOISE
        .iter()
        .fold(title.to_string(), |acc, word| acc.replace(word, " "));
    team_names()
        .first_match(&masked)
        .map(|m| m.text.to_string())
}
