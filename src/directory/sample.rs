use super::Person;

const SAMPLE_ROSTER: &[(i64, &str, &str)] = &[
    (1, "Ahmet Yılmaz", "ahmet.yilmaz@company.com.tr"),
    (2, "Ahmet Kaya", "ahmet.kaya@company.com.tr"),
    (3, "Ahmet Özkan", "a.ozkan@company.com.tr"),
    (4, "Ali Şahin", "ali.sahin@company.com.tr"),
    (5, "Ali Demir", "ali.demir@company.com.tr"),
    (6, "Ali Can Yılmaz", "alican.yilmaz@company.com.tr"),
    (7, "Mehmet Şahin", "mehmet.sahin@company.com.tr"),
    (8, "Şahin Koç", "sahin.koc@company.com.tr"),
    (9, "Şahin Nicat, Ph.D", "snicat@company.com.tr"),
    (10, "Arda Orçun", "arda.orcun@company.com.tr"),
    (11, "Ege Gülünay", "ege.gulunay@company.com.tr"),
    (12, "Özden Gebizli Orkon", "ozden.orkon@company.com.tr"),
    (13, "Fatma Özden", "fatma.ozden@company.com.tr"),
    (14, "Emre Çelik", "emre.celik@company.com.tr"),
    (15, "Emre Çetin", "emre.cetin@company.com.tr"),
    (16, "Deniz Kaya", "deniz.kaya@company.com.tr"),
    (17, "Deniz Kayahan", "deniz.kayahan@company.com.tr"),
    (18, "Can Özgür", "can.ozgur@company.com.tr"),
    (19, "Can Öztürk", "can.ozturk@company.com.tr"),
    (20, "Selin Demir", "selin.demir@company.com.tr"),
    (21, "Burak Demir", "burak.demir@company.com.tr"),
    (22, "Zeynep Arslan", "zeynep.arslan@company.com.tr"),
    (23, "Mert Yıldız", "mert.yildiz@company.com.tr"),
    (24, "Elif Özkan", "elif.ozkan@company.com.tr"),
    (25, "Kaan Şahin", "kaan.sahin@company.com.tr"),
    (26, "Hasan Yıldırım", "hasan.yildirim@company.com.tr"),
    (27, "Hasan Can Demir", "hasancan.demir@company.com.tr"),
];

pub(super) fn sample_people() -> Vec<Person> {
    SAMPLE_ROSTER.iter().map(|&(id, name, email)| Person::new(id, name, email)).collect()
}
